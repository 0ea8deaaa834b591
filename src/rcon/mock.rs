//! In-process RCON server for tests.

use super::{RconPacket, RconPacketType};
use bytes::{BufMut, Bytes};
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::{TcpListener, TcpStream},
};

/// What the server does with a command once logged in.
pub(crate) enum Reply {
    /// One packet per body, all carrying the request id.
    Packets(Vec<String>),
    /// Raw bytes, written as-is.
    Raw(Vec<u8>),
    /// Nothing at all.
    Silence,
}

pub(crate) type Handler = fn(&str) -> Reply;

/// Minecraft-like behaviour: `list` splits its answer over two packets,
/// `help` sends a full 4096 byte body and then a short one, `echo <text>`
/// answers with `<text>` split in half, `huge` sends a frame with a bogus
/// size, `quiet` sends nothing.
pub(crate) fn vanilla(command: &str) -> Reply {
    match command {
        "list" => Reply::Packets(vec!["Players: ".into(), "Alice, Bob".into()]),
        "help" => Reply::Packets(vec!["a".repeat(4096), "tail".into()]),
        "quiet" => Reply::Silence,
        "huge" => {
            let mut raw = Vec::new();
            raw.put_u32_le(1_000_000);
            raw.extend_from_slice(b"not really a million bytes");
            Reply::Raw(raw)
        }
        _ => match command.strip_prefix("echo ") {
            Some(text) => {
                let (head, tail) = text.split_at(text.len() / 2);
                Reply::Packets(vec![head.into(), tail.into()])
            }
            None => Reply::Packets(vec![format!("Unknown command: {command}")]),
        },
    }
}

/// Start a server that accepts `password` and answers commands with `handler`.
/// Returns the port it listens on.
pub(crate) async fn spawn(password: &'static str, handler: Handler) -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        while let Ok((socket, _)) = listener.accept().await {
            tokio::spawn(serve(socket, password, handler));
        }
    });

    port
}

/// Start a server that accepts `password`, then closes the connection.
pub(crate) async fn spawn_close_after_login(password: &'static str) -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            if let Some(login) = read_request(&mut socket).await {
                if login.payload == password.as_bytes() {
                    reply(&mut socket, login.request_id, RconPacketType::Response, "").await;
                }
            }
        }
    });

    port
}

/// Start a server that reads the login and never answers.
pub(crate) async fn spawn_mute() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            tokio::spawn(async move { while read_request(&mut socket).await.is_some() {} });
        }
    });

    port
}

/// Start a server that accepts connections and closes them without a word.
pub(crate) async fn spawn_hangup() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            let _ = read_request(&mut socket).await;
        }
    });

    port
}

async fn serve(mut socket: TcpStream, password: &'static str, handler: Handler) {
    let Some(login) = read_request(&mut socket).await else {
        return;
    };

    if login.packet_type != RconPacketType::Login || login.payload != password.as_bytes() {
        reply(&mut socket, -1, RconPacketType::RunCommand, "").await;
        return;
    }
    reply(&mut socket, login.request_id, RconPacketType::Response, "").await;

    while let Some(request) = read_request(&mut socket).await {
        let command = request.text();
        match handler(&command) {
            Reply::Packets(bodies) => {
                for body in bodies {
                    reply(&mut socket, request.request_id, RconPacketType::Response, &body).await;
                }
            }
            Reply::Raw(raw) => {
                let _ = socket.write_all(&raw).await;
            }
            Reply::Silence => {}
        }
    }
}

async fn read_request(socket: &mut TcpStream) -> Option<RconPacket> {
    let len = socket.read_u32_le().await.ok()?;
    let mut frame = vec![0; len as usize];
    socket.read_exact(&mut frame).await.ok()?;

    Some(RconPacket::decode(Bytes::from(frame)))
}

async fn reply(socket: &mut TcpStream, request_id: i32, packet_type: RconPacketType, body: &str) {
    let packet = RconPacket {
        request_id,
        packet_type,
        payload: Bytes::copy_from_slice(body.as_bytes()),
    };

    let _ = socket.write_all(&packet.bytes()).await;
}
