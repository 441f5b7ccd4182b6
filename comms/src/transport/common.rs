use std::pin::Pin;

use anyhow::Context;
use serde::de::DeserializeOwned;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio_stream::{wrappers::SplitStream, Stream, StreamExt};

/// Every command and event is a single JSON document terminated by this delimiter
pub const NEW_LINE: &[u8; 2] = b"\r\n";

pub type BoxedStream<Item> = Pin<Box<dyn Stream<Item = Item> + Send>>;

/// Decodes every `\n` terminated frame of `reader` as a `T`
///
/// Frames are parsed as raw bytes, so a frame that is not UTF-8 or not a `T` is a
/// deserialize error and the stream goes on. Only a failing reader yields an [std::io::Error].
pub fn json_frames<R, T>(reader: R, peer: &'static str) -> BoxedStream<anyhow::Result<T>>
where
    R: AsyncRead + Unpin + Send + 'static,
    T: DeserializeOwned + Send + 'static,
{
    Box::pin(
        SplitStream::new(BufReader::new(reader).split(b'\n')).map(move |frame| {
            frame
                .with_context(|| format!("could not read a frame from the {}", peer))
                .and_then(|mut frame| {
                    if frame.last() == Some(&b'\r') {
                        frame.pop();
                    }

                    serde_json::from_slice::<T>(&frame)
                        .with_context(|| format!("failed to deserialize the frame from the {}", peer))
                })
        }),
    )
}
