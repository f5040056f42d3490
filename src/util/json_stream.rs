// This file is part of the product Lingod.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

//! Incremental JSON array responses.
//!
//! The listing endpoints stream arbitrarily large result sets without ever
//! materializing them: rows are pulled from the store one cursor batch at a
//! time and written out as they are fetched. Memory use is bounded by the
//! batch size, not the row count.

use crate::store::types::{StoreError, TagRow, TranslationRow};
use actix_web::HttpResponse;
use actix_web::web::Bytes;
use futures_util::Stream;
use futures_util::stream;
use serde::Serialize;
use std::fmt;

/// How string content is escaped in the emitted JSON.
///
/// `Ascii` escapes every non-ASCII character as `\uXXXX` (surrogate pairs
/// for characters outside the BMP) and forward slashes as `\/`. `Raw`
/// leaves both alone. The two listing endpoints deliberately differ here
/// and clients depend on the byte-level output of each.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JsonEscaping {
    Ascii,
    Raw,
}

#[derive(Debug)]
pub enum StreamError {
    Store(StoreError),
    Encode(serde_json::Error),
}

impl fmt::Display for StreamError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StreamError::Store(err) => write!(f, "Row fetch failed mid-stream: {}", err),
            StreamError::Encode(err) => write!(f, "Row encoding failed mid-stream: {}", err),
        }
    }
}

impl std::error::Error for StreamError {}

/// A row that can report the cursor position for the batch after it.
pub trait CursorRow: Serialize {
    fn cursor_id(&self) -> u64;
}

impl CursorRow for TranslationRow {
    fn cursor_id(&self) -> u64 {
        self.id
    }
}

impl CursorRow for TagRow {
    fn cursor_id(&self) -> u64 {
        self.id
    }
}

enum Step {
    Open,
    Rows { after: Option<u64>, first: bool },
    Closed,
}

/// Build the body stream for a JSON array of rows. `fetch` is called with
/// the id of the last emitted row (or `None` for the first batch) and must
/// return the next batch in id order; an empty batch ends the array.
///
/// A fetch or encode failure is surfaced as a stream error, which aborts
/// the response mid-body. The opening bracket has been sent by then, so
/// the client sees a truncated payload rather than an error status; that
/// is the cost of not buffering the full result.
pub fn json_array_stream<R, F>(
    mut fetch: F,
    escaping: JsonEscaping,
) -> impl Stream<Item = Result<Bytes, StreamError>>
where
    R: CursorRow,
    F: FnMut(Option<u64>) -> Result<Vec<R>, StoreError>,
{
    stream::unfold(Step::Open, move |step| {
        let out = match step {
            Step::Open => Some((
                Ok(Bytes::from_static(b"[")),
                Step::Rows {
                    after: None,
                    first: true,
                },
            )),
            Step::Rows { after, first } => match fetch(after) {
                Err(err) => Some((Err(StreamError::Store(err)), Step::Closed)),
                Ok(batch) if batch.is_empty() => {
                    Some((Ok(Bytes::from_static(b"]")), Step::Closed))
                }
                Ok(batch) => {
                    let mut chunk = String::new();
                    let mut first = first;
                    let mut after = after;
                    let mut failed = None;
                    for row in &batch {
                        match encode_row(row, escaping) {
                            Ok(json) => {
                                if !first {
                                    chunk.push(',');
                                }
                                chunk.push_str(&json);
                                first = false;
                                after = Some(row.cursor_id());
                            }
                            Err(err) => {
                                failed = Some(err);
                                break;
                            }
                        }
                    }
                    match failed {
                        Some(err) => Some((Err(StreamError::Encode(err)), Step::Closed)),
                        None => Some((Ok(Bytes::from(chunk)), Step::Rows { after, first })),
                    }
                }
            },
            Step::Closed => None,
        };
        std::future::ready(out)
    })
}

/// Wrap a body stream in the response the listing endpoints send.
pub fn streamed_json_response<S>(body: S) -> HttpResponse
where
    S: Stream<Item = Result<Bytes, StreamError>> + 'static,
{
    HttpResponse::Ok()
        .content_type("application/json")
        .insert_header(("Cache-Control", "no-cache"))
        .streaming(body)
}

fn encode_row<R: Serialize>(row: &R, escaping: JsonEscaping) -> Result<String, serde_json::Error> {
    let json = serde_json::to_string(row)?;
    Ok(match escaping {
        JsonEscaping::Raw => json,
        JsonEscaping::Ascii => escape_ascii(&json),
    })
}

/// Escape a serialized JSON document down to ASCII. Slashes and non-ASCII
/// characters only occur inside string literals, so a character-level pass
/// over the document is safe.
fn escape_ascii(json: &str) -> String {
    let mut out = String::with_capacity(json.len());
    for c in json.chars() {
        if c == '/' {
            out.push_str("\\/");
        } else if (c as u32) < 0x80 {
            out.push(c);
        } else {
            let mut units = [0u16; 2];
            for unit in c.encode_utf16(&mut units) {
                out.push_str(&format!("\\u{:04x}", unit));
            }
        }
    }
    out
}
