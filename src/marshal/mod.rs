//! # Result Marshaling
//!
//! Streams a row source into a JSON array of objects.
//!
//! The column layout (names plus decode kind) is resolved once from the
//! first row and reused for every row after it. Output is written row by
//! row, so memory stays bounded by one row. Nothing reaches the sink until
//! the first row (or the end of an empty result) has been fetched, which
//! lets callers turn an early failure into an error status.

mod errors;
mod sink;
mod types;

use std::fmt;

use bytes::Bytes;
use futures_util::{Stream, StreamExt};

pub use errors::{MarshalError, MarshalResult};
pub use sink::{channel, ChannelSink, ChunkStream, JsonSink};
pub use types::{DecodeKind, MySqlTypes, SqliteTypes, TypeResolver};

use crate::value::SqlValue;

/// Name and native type of one result column
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMeta {
    pub name: String,
    pub type_name: String,
}

/// A backend row that can describe and decode its cells
pub trait DecodeRow {
    fn describe(&self) -> Vec<ColumnMeta>;

    /// Decode one cell; SQL NULL decodes to `SqlValue::Null` for every kind
    fn decode(&self, index: usize, kind: DecodeKind) -> Result<SqlValue, String>;
}

#[derive(Debug)]
struct LayoutColumn {
    /// JSON-encoded key, written verbatim
    key: String,
    kind: DecodeKind,
}

/// Column layout shared by every row of one result set
#[derive(Debug)]
struct RowLayout {
    columns: Vec<LayoutColumn>,
}

impl RowLayout {
    fn resolve<R: DecodeRow>(row: &R, resolver: &dyn TypeResolver) -> MarshalResult<Self> {
        let columns = row
            .describe()
            .into_iter()
            .map(|meta| {
                Ok(LayoutColumn {
                    key: serde_json::to_string(&meta.name)?,
                    kind: resolver.resolve(&meta.type_name),
                })
            })
            .collect::<MarshalResult<Vec<_>>>()?;
        Ok(Self { columns })
    }

    /// Encode one row as a JSON object, keys in result order
    fn write_row<R: DecodeRow>(&self, row: &R, out: &mut Vec<u8>) -> MarshalResult<()> {
        out.push(b'{');
        for (index, column) in self.columns.iter().enumerate() {
            if index > 0 {
                out.push(b',');
            }
            out.extend_from_slice(column.key.as_bytes());
            out.push(b':');
            let value = row.decode(index, column.kind).map_err(|reason| MarshalError::Decode {
                column: column.key.trim_matches('"').to_string(),
                reason,
            })?;
            serde_json::to_writer(&mut *out, &value)?;
        }
        out.push(b'}');
        Ok(())
    }
}

/// Marshal every row of `rows` into `sink` as one JSON array.
///
/// Returns the number of rows written. An empty result writes `[]`.
pub async fn marshal_rows<S, R, E>(
    mut rows: S,
    resolver: &dyn TypeResolver,
    sink: &mut dyn JsonSink,
) -> MarshalResult<u64>
where
    S: Stream<Item = Result<R, E>> + Unpin + Send,
    R: DecodeRow + Send,
    E: fmt::Display + Send,
{
    let mut layout: Option<RowLayout> = None;
    let mut count = 0u64;

    while let Some(next) = rows.next().await {
        let chunk = {
            let row = next.map_err(|e| MarshalError::Fetch(e.to_string()))?;
            let layout = match &mut layout {
                Some(layout) => layout,
                slot @ None => slot.insert(RowLayout::resolve(&row, resolver)?),
            };

            let mut chunk = Vec::with_capacity(64 * layout.columns.len() + 2);
            chunk.push(if count == 0 { b'[' } else { b',' });
            layout.write_row(&row, &mut chunk)?;
            chunk
        };
        sink.write_chunk(Bytes::from(chunk)).await?;
        count += 1;
    }

    let tail: &'static [u8] = if count == 0 { b"[]" } else { b"]" };
    sink.write_chunk(Bytes::from_static(tail)).await?;
    Ok(count)
}
