//! JSON-lines transport.
//!
//! One task per input line, one reply per output line. A request without an
//! `id` gets the bare reply payload back (a spectrum pair or the sentinel
//! string). A request with an `id` gets `{"id": .., "reply": ..}`. Failures
//! produce `{"error": ..}` and the loop keeps going.

use crate::error::{Error, Result};
use crate::executor::DispatchWorker;
use crate::message::{Reply, Task};
use serde_json::{json, Value};
use std::io::{BufRead, Write};

/// Serve tasks from `reader` until EOF. Returns the number of replies written.
pub fn serve<R, W>(worker: &DispatchWorker, reader: R, mut writer: W) -> Result<usize>
where
    R: BufRead,
    W: Write,
{
    let mut served = 0;

    for line in reader.lines() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let out = respond(worker, line);
        serde_json::to_writer(&mut writer, &out)?;
        writer.write_all(b"\n")?;
        writer.flush()?;
        served += 1;
    }

    log::debug!("transport reached EOF after {} replies", served);
    Ok(served)
}

fn respond(worker: &DispatchWorker, line: &str) -> Value {
    let mut value: Value = match serde_json::from_str(line) {
        Ok(value) => value,
        Err(e) => return error_line(None, &Error::from(e)),
    };

    let id = value.as_object_mut().and_then(|obj| obj.remove("id"));

    let outcome = serde_json::from_value::<Task>(value)
        .map_err(Error::from)
        .and_then(|task| worker.call(task))
        .and_then(|reply| reply_line(id.clone(), &reply));

    match outcome {
        Ok(out) => out,
        Err(e) => error_line(id, &e),
    }
}

fn reply_line(id: Option<Value>, reply: &Reply) -> Result<Value> {
    let payload = serde_json::to_value(reply)?;
    Ok(match id {
        Some(id) => json!({ "id": id, "reply": payload }),
        None => payload,
    })
}

fn error_line(id: Option<Value>, err: &Error) -> Value {
    log::warn!("transport request failed: {}", err);
    match id {
        Some(id) => json!({ "id": id, "error": err.to_string() }),
        None => json!({ "error": err.to_string() }),
    }
}
