//! Per-connection read/write pumps.
//!
//! Each accepted WebSocket runs two tasks:
//!
//! - the read pump turns inbound frames into chat messages through
//!   [`SendMessageUseCase`] and watches the pong deadline
//! - the write pump drains the client's outbound queue onto the socket and
//!   sends keepalive pings
//!
//! They only talk to each other through the hub: the read pump ending leads to
//! an unregister, which closes the queue, which ends the write pump.

use std::{fmt::Display, sync::Arc, time::Duration};

use axum::{
    body::Bytes,
    extract::ws::{Message, WebSocket},
};
use futures_util::{Sink, SinkExt, Stream, StreamExt};
use tokio::{
    sync::mpsc,
    time::{Instant, MissedTickBehavior},
};

use crate::{
    config::PumpConfig,
    domain::{ChannelId, User},
    infrastructure::hub::{ClientHandle, Frame, Hub},
    usecase::SendMessageUseCase,
};

/// Why a pump stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PumpExit {
    /// The peer sent a close frame
    PeerClosed,
    /// The underlying stream ended without a close frame
    StreamEnded,
    /// No pong arrived within the read deadline
    IdleTimeout,
    ReadFailed(String),
    /// The hub closed the outbound queue
    QueueClosed,
    WriteFailed(String),
}

/// Read inbound frames until the connection ends.
///
/// The read deadline is `pong_wait` from the last pong (or from the start).
/// Per-message failures are logged and skipped.
pub async fn read_pump<S, E>(
    mut stream: S,
    user: &User,
    channel_id: ChannelId,
    send_message: &SendMessageUseCase,
    pong_wait: Duration,
) -> PumpExit
where
    S: Stream<Item = Result<Message, E>> + Unpin,
    E: Display,
{
    let mut deadline = Instant::now() + pong_wait;

    loop {
        let message = match tokio::time::timeout_at(deadline, stream.next()).await {
            Err(_) => return PumpExit::IdleTimeout,
            Ok(None) => return PumpExit::StreamEnded,
            Ok(Some(Err(e))) => return PumpExit::ReadFailed(e.to_string()),
            Ok(Some(Ok(message))) => message,
        };

        match message {
            Message::Text(text) => {
                handle_frame(text.as_str(), user, channel_id, send_message).await;
            }
            Message::Binary(bytes) => match std::str::from_utf8(&bytes) {
                Ok(text) => handle_frame(text, user, channel_id, send_message).await,
                Err(_) => tracing::debug!(user = %user.display_name, "Ignoring non UTF-8 binary frame"),
            },
            Message::Pong(_) => {
                deadline = Instant::now() + pong_wait;
            }
            // Answered by the WebSocket layer.
            Message::Ping(_) => {}
            Message::Close(_) => return PumpExit::PeerClosed,
        }
    }
}

async fn handle_frame(
    text: &str,
    user: &User,
    channel_id: ChannelId,
    send_message: &SendMessageUseCase,
) {
    match send_message.execute(user, channel_id, text).await {
        Ok(Some(_)) => {
            tracing::debug!(
                user = %user.display_name,
                user_id = %user.id,
                channel_id = %channel_id,
                "Message broadcast"
            );
        }
        Ok(None) => {}
        Err(e) => {
            tracing::warn!(
                user = %user.display_name,
                user_id = %user.id,
                channel_id = %channel_id,
                "Dropping message: {}",
                e
            );
        }
    }
}

/// Drain `queue` onto `sink` until the queue closes or a write fails.
///
/// Each write is bounded by `write_wait`. A ping goes out every `ping_period`.
/// When the hub closes the queue a close frame is sent before returning.
pub async fn write_pump<K>(
    mut sink: K,
    mut queue: mpsc::Receiver<Frame>,
    write_wait: Duration,
    ping_period: Duration,
) -> PumpExit
where
    K: Sink<Message> + Unpin,
    K::Error: Display,
{
    let mut ticker = tokio::time::interval_at(Instant::now() + ping_period, ping_period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            // Pings take precedence over queued frames.
            biased;

            _ = ticker.tick() => {
                if let Err(e) = write(&mut sink, Message::Ping(Bytes::new()), write_wait).await {
                    return PumpExit::WriteFailed(e);
                }
            }
            frame = queue.recv() => match frame {
                Some(frame) => {
                    if let Err(e) = write(&mut sink, Message::Text(frame.to_string().into()), write_wait).await {
                        return PumpExit::WriteFailed(e);
                    }
                }
                None => {
                    let _ = write(&mut sink, Message::Close(None), write_wait).await;
                    let _ = tokio::time::timeout(write_wait, sink.close()).await;
                    return PumpExit::QueueClosed;
                }
            },
        }
    }
}

async fn write<K>(sink: &mut K, message: Message, write_wait: Duration) -> Result<(), String>
where
    K: Sink<Message> + Unpin,
    K::Error: Display,
{
    match tokio::time::timeout(write_wait, sink.send(message)).await {
        Ok(Ok(())) => Ok(()),
        Ok(Err(e)) => Err(e.to_string()),
        Err(_) => Err("write deadline exceeded".to_string()),
    }
}

/// Register the connection with the hub and run both pumps to completion.
///
/// Whichever pump stops first, the client is unregistered exactly once and the
/// socket is dropped.
pub async fn serve(
    socket: WebSocket,
    hub: Hub,
    user: Arc<User>,
    channel_id: ChannelId,
    send_message: SendMessageUseCase,
    pump: PumpConfig,
) {
    let (client, queue) = ClientHandle::new(user.clone(), channel_id, pump.queue_capacity);
    let connection_id = client.id;

    if let Err(e) = hub.register(client).await {
        tracing::warn!(user = %user.display_name, "Could not register client: {}", e);
        return;
    }
    tracing::info!(
        user = %user.display_name,
        user_id = %user.id,
        channel_id = %channel_id,
        "Client connected"
    );

    let (sink, stream) = socket.split();

    let mut write_task = tokio::spawn(write_pump(
        sink,
        queue,
        pump.write_wait,
        pump.ping_period(),
    ));
    let reader = user.clone();
    let mut read_task = tokio::spawn(async move {
        read_pump(stream, &reader, channel_id, &send_message, pump.pong_wait).await
    });

    // If either task completes, wind the other one down
    let exit = tokio::select! {
        exit = &mut read_task => {
            // Unregistering closes the queue; the write pump then sends a close frame.
            unregister(&hub, connection_id).await;
            if tokio::time::timeout(pump.write_wait, &mut write_task).await.is_err() {
                write_task.abort();
            }
            exit
        }
        exit = &mut write_task => {
            read_task.abort();
            unregister(&hub, connection_id).await;
            exit
        }
    };

    match exit {
        Ok(reason) => tracing::info!(
            user = %user.display_name,
            user_id = %user.id,
            channel_id = %channel_id,
            reason = ?reason,
            "Client disconnected"
        ),
        Err(e) => tracing::error!(
            user = %user.display_name,
            channel_id = %channel_id,
            "Client task failed: {}",
            e
        ),
    }
}

async fn unregister(hub: &Hub, connection_id: crate::domain::ConnectionId) {
    if let Err(e) = hub.unregister(connection_id).await {
        tracing::debug!("Unregister skipped: {}", e);
    }
}
