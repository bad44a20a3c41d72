//! The request loop driving one client session.

use std::io::{BufRead, Write};

use lsp_types::{
    DidOpenTextDocumentParams, InitializeParams, NumberOrString, RegistrationParams,
};
use ripple_lsp_host::{Session, SessionState};
use serde::Serialize;
use serde_json::{Value, json};
use tracing::{debug, info, warn};

use crate::error::ServerError;
use crate::jsonrpc::{ErrorCode, Message, OutgoingRequest, Response, ResponseError};
use crate::transport::Transport;

const SERVER_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::server");

const REGISTER_CAPABILITY: &str = "client/registerCapability";

/// Why the server loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitReason {
    /// `exit` after a `shutdown` request.
    Requested,
    /// `exit` without a preceding `shutdown`.
    WithoutShutdown,
    /// The client closed the stream.
    Disconnected,
}

impl ExitReason {
    /// Process exit code for the reason.
    #[must_use]
    pub const fn code(self) -> u8 {
        match self {
            Self::Requested => 0,
            Self::WithoutShutdown | Self::Disconnected => 1,
        }
    }
}

/// Serves one session over a framed transport.
pub struct Server<R, W> {
    transport: Transport<R, W>,
    session: Session,
    shutdown_requested: bool,
    next_request_id: i32,
}

impl<R: BufRead, W: Write> Server<R, W> {
    /// Binds a session to a transport.
    pub const fn new(transport: Transport<R, W>, session: Session) -> Self {
        Self {
            transport,
            session,
            shutdown_requested: false,
            next_request_id: 1,
        }
    }

    /// The served session.
    pub const fn session(&self) -> &Session {
        &self.session
    }

    /// The underlying transport.
    pub const fn transport(&self) -> &Transport<R, W> {
        &self.transport
    }

    /// Processes messages until `exit` or the end of the stream.
    ///
    /// # Errors
    ///
    /// Returns a [`ServerError`] when the transport fails or an outgoing
    /// message cannot be encoded. Malformed incoming messages are answered
    /// with error responses instead.
    pub fn run(&mut self) -> Result<ExitReason, ServerError> {
        loop {
            let Some(payload) = self.transport.receive()? else {
                info!(target: SERVER_TARGET, "client closed the connection");
                return Ok(ExitReason::Disconnected);
            };
            match Message::parse(&payload) {
                Ok(message) => {
                    if let Some(reason) = self.handle(message)? {
                        info!(target: SERVER_TARGET, ?reason, "exiting");
                        return Ok(reason);
                    }
                }
                Err(error) => {
                    warn!(target: SERVER_TARGET, message = %error.message, "rejecting message");
                    self.send(&Response::failure(None, error))?;
                }
            }
        }
    }

    fn handle(&mut self, message: Message) -> Result<Option<ExitReason>, ServerError> {
        match message {
            Message::Request { id, method, params } => {
                let response = self.handle_request(id, &method, params);
                self.send(&response)?;
                Ok(None)
            }
            Message::Notification { method, params } => {
                self.handle_notification(&method, params)
            }
            Message::Response {
                id,
                error: rejection,
                ..
            } => {
                match rejection {
                    Some(error) => warn!(
                        target: SERVER_TARGET,
                        ?id,
                        code = error.code,
                        message = %error.message,
                        "client rejected a server request"
                    ),
                    None => debug!(target: SERVER_TARGET, ?id, "client acknowledged request"),
                }
                Ok(None)
            }
        }
    }

    fn handle_request(
        &mut self,
        request_id: NumberOrString,
        method: &str,
        params: Value,
    ) -> Response {
        let id = Some(request_id);
        match method {
            "initialize" => match self.initialize(params) {
                Ok(result) => Response::success(id, result),
                Err(error) => Response::failure(id, error),
            },
            "shutdown" => {
                self.shutdown_requested = true;
                Response::success(id, Value::Null)
            }
            _ if self.shutdown_requested => Response::failure(
                id,
                ResponseError::new(ErrorCode::InvalidRequest, "server is shutting down"),
            ),
            _ => match self.session.state() {
                SessionState::Ready => Response::failure(
                    id,
                    ResponseError::new(
                        ErrorCode::MethodNotFound,
                        format!("method '{method}' is not handled by this server"),
                    ),
                ),
                state => Response::failure(
                    id,
                    ResponseError::new(
                        ErrorCode::ServerNotInitialized,
                        format!("server is not initialized; session is {state}"),
                    ),
                ),
            },
        }
    }

    fn initialize(&mut self, raw: Value) -> Result<Value, ResponseError> {
        let params: InitializeParams = serde_json::from_value(raw).map_err(|error| {
            ResponseError::new(
                ErrorCode::InvalidParams,
                format!("invalid initialize params: {error}"),
            )
        })?;
        let result = self.session.initialize(&params).map_err(|error| {
            ResponseError::new(ErrorCode::InternalError, error.to_string())
                .with_data(json!({ "retry": false }))
        })?;
        serde_json::to_value(result)
            .map_err(|error| ResponseError::new(ErrorCode::InternalError, error.to_string()))
    }

    fn handle_notification(
        &mut self,
        method: &str,
        params: Value,
    ) -> Result<Option<ExitReason>, ServerError> {
        match method {
            "initialized" => self.arm_file_watch()?,
            "exit" => {
                let reason = if self.shutdown_requested {
                    ExitReason::Requested
                } else {
                    ExitReason::WithoutShutdown
                };
                return Ok(Some(reason));
            }
            "textDocument/didOpen" => self.open_document(params),
            _ => debug!(target: SERVER_TARGET, method, "ignoring notification"),
        }
        Ok(None)
    }

    fn arm_file_watch(&mut self) -> Result<(), ServerError> {
        let registration = match self.session.initialized() {
            Ok(Some(registration)) => registration,
            Ok(None) => return Ok(()),
            Err(error) => {
                warn!(target: SERVER_TARGET, %error, "ignoring initialized notification");
                return Ok(());
            }
        };
        let params = serde_json::to_value(RegistrationParams {
            registrations: vec![registration],
        })?;
        let id = self.next_request_id;
        self.next_request_id += 1;
        self.send(&OutgoingRequest::new(id, REGISTER_CAPABILITY, params))
    }

    fn open_document(&self, raw: Value) {
        let params: DidOpenTextDocumentParams = match serde_json::from_value(raw) {
            Ok(params) => params,
            Err(error) => {
                warn!(target: SERVER_TARGET, %error, "malformed didOpen notification");
                return;
            }
        };
        let uri = params.text_document.uri;
        match self.session.open_document(&uri) {
            Ok(Some(project)) => debug!(
                target: SERVER_TARGET,
                uri = uri.as_str(),
                root = %project.root(),
                "document opened"
            ),
            Ok(None) => {}
            Err(error) => warn!(target: SERVER_TARGET, %error, "document opened before ready"),
        }
    }

    fn send<T: Serialize>(&mut self, message: &T) -> Result<(), ServerError> {
        let payload = serde_json::to_vec(message)?;
        self.transport.send(&payload)?;
        Ok(())
    }
}
