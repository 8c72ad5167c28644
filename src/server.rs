use std::io::{BufRead, BufReader, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::mpsc;
use std::thread::{self, JoinHandle};

use crate::commands::{parse_command, CommandResponse, ViewerCommand};

/// A parsed command on its way to the UI thread, carrying the back-channel
/// for the response.
pub struct CommandRequest {
    pub command: ViewerCommand,
    pub response_tx: mpsc::Sender<CommandResponse>,
}

const MAX_PORT_ATTEMPTS: u16 = 100;

fn try_bind_port(starting_port: u16) -> std::io::Result<(TcpListener, u16)> {
    for offset in 0..MAX_PORT_ATTEMPTS {
        let port = starting_port.saturating_add(offset);
        match TcpListener::bind(format!("127.0.0.1:{}", port)) {
            Ok(listener) => return Ok((listener, port)),
            Err(e) if e.kind() == std::io::ErrorKind::AddrInUse => {
                continue;
            }
            Err(e) => return Err(e),
        }
    }
    Err(std::io::Error::new(
        std::io::ErrorKind::AddrInUse,
        format!(
            "could not find available port in range {}-{}",
            starting_port,
            starting_port.saturating_add(MAX_PORT_ATTEMPTS - 1)
        ),
    ))
}

/// Listens for line-oriented viewer commands on localhost. Each accepted
/// connection gets its own thread; commands are handed to the UI loop
/// through `command_tx` and answered over the same connection.
pub fn start_server(
    port: u16,
    command_tx: async_channel::Sender<CommandRequest>,
) -> std::io::Result<JoinHandle<()>> {
    let (listener, actual_port) = try_bind_port(port)?;
    log::info!("control server listening on 127.0.0.1:{}", actual_port);

    let handle = thread::spawn(move || {
        for stream in listener.incoming() {
            match stream {
                Ok(stream) => {
                    let command_tx = command_tx.clone();
                    thread::spawn(move || {
                        handle_client(stream, command_tx);
                    });
                }
                Err(e) => {
                    log::warn!("connection error: {}", e);
                }
            }
        }
    });

    Ok(handle)
}

fn handle_client(mut stream: TcpStream, command_tx: async_channel::Sender<CommandRequest>) {
    let peer = stream
        .peer_addr()
        .map(|a| a.to_string())
        .unwrap_or_else(|_| "unknown".to_string());

    let reader = match stream.try_clone() {
        Ok(s) => BufReader::new(s),
        Err(e) => {
            log::warn!("failed to clone stream for {}: {}", peer, e);
            return;
        }
    };

    for line in reader.lines() {
        let line = match line {
            Ok(l) => l,
            Err(e) => {
                log::warn!("read error from {}: {}", peer, e);
                break;
            }
        };

        if line.is_empty() {
            continue;
        }

        let response = match parse_command(&line) {
            Ok(command) => {
                let (response_tx, response_rx) = mpsc::channel();
                let request = CommandRequest {
                    command,
                    response_tx,
                };

                if command_tx.send_blocking(request).is_err() {
                    CommandResponse::Error("viewer not available".to_string())
                } else {
                    match response_rx.recv() {
                        Ok(response) => response,
                        Err(_) => CommandResponse::Error("no response from viewer".to_string()),
                    }
                }
            }
            Err(e) => CommandResponse::Error(e),
        };

        let response_line = format!("{}\n", response);
        if let Err(e) = stream
            .write_all(response_line.as_bytes())
            .and_then(|()| stream.flush())
        {
            log::warn!("write error to {}: {}", peer, e);
            break;
        }
    }
}
