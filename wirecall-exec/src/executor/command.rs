use std::fmt;
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use tracing::{debug, warn};
use wirecall_core::http::LOCATION;
use wirecall_core::{Method, Request, Response};

use crate::classify::{Disposition, FromSentinel, ProtocolError};
use crate::descriptor::{Operation, OperationId};
use crate::executor::{ExecError, ExecutorConfig};
use crate::retry::{FailureKind, RetryContext, RetryDecision, RetryPolicy};
use crate::transport::Transport;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandState {
    Sending,
    AwaitingResponse,
    Decoding,
    Classifying,
    Retrying,
    Terminal,
}

impl fmt::Display for CommandState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            CommandState::Sending => "sending",
            CommandState::AwaitingResponse => "awaiting_response",
            CommandState::Decoding => "decoding",
            CommandState::Classifying => "classifying",
            CommandState::Retrying => "retrying",
            CommandState::Terminal => "terminal",
        })
    }
}

/// Execution-scoped bookkeeping for one invocation.
struct Command {
    operation: OperationId,
    /// Unfiltered; filters are re-applied per attempt so signatures are fresh.
    request: Request,
    attempt: u32,
    redirects: u32,
    state: CommandState,
}

impl Command {
    fn transition(&mut self, next: CommandState, status: Option<u16>) {
        debug!(
            operation = %self.operation,
            attempt = self.attempt,
            status = status,
            from = %self.state,
            to = %next,
            "command state"
        );
        self.state = next;
    }

    fn protocol_error(&self, response: &Response, retryable: bool) -> ExecError {
        ExecError::Protocol(ProtocolError::from_response(
            self.operation.clone(),
            response,
            self.attempt,
            retryable,
        ))
    }
}

enum Next {
    Resend { delay: Duration },
    Done,
}

pub(crate) async fn run<T>(
    request: Request,
    operation: Operation<T>,
    transport: Arc<dyn Transport>,
    config: Arc<ExecutorConfig>,
) -> Result<T, ExecError>
where
    T: FromSentinel + Send + 'static,
{
    let descriptor = operation.descriptor();
    let retry = descriptor.retry_policy();
    let mut cmd = Command {
        operation: descriptor.id().clone(),
        request,
        attempt: 1,
        redirects: 0,
        state: CommandState::Sending,
    };

    loop {
        let outgoing = match descriptor.filters().apply(cmd.request.clone()) {
            Ok(r) => r,
            Err(e) => {
                cmd.transition(CommandState::Terminal, None);
                return Err(ExecError::Filter(e));
            }
        };
        if cmd.state != CommandState::Sending {
            cmd.transition(CommandState::Sending, None);
        }
        debug!(
            operation = %cmd.operation,
            request = %outgoing.request_line(),
            headers = %outgoing
                .headers()
                .redacted(config.sensitive_headers.always_redact.as_slice())
                .to_sorted_text(),
            "sending request"
        );

        let sent = transport.send(outgoing, config.request_timeout, config.max_response_bytes);
        cmd.transition(CommandState::AwaitingResponse, None);
        let response = match sent.await {
            Ok(r) => r,
            Err(err) => {
                let decision = retry.decide(&RetryContext {
                    attempt_no: cmd.attempt,
                    redirects: cmd.redirects,
                    failure: FailureKind::Transport(&err),
                    now: SystemTime::now(),
                });
                match decision {
                    RetryDecision::RetryAfter { delay, reason } => {
                        warn!(operation = %cmd.operation, attempt = cmd.attempt, error = %err, ?reason, ?delay, "retrying after transport error");
                        cmd.transition(CommandState::Retrying, None);
                        cmd.attempt += 1;
                        tokio::time::sleep(delay).await;
                        continue;
                    }
                    RetryDecision::Stop { .. } => {
                        cmd.transition(CommandState::Terminal, None);
                        return Err(ExecError::Transport(err));
                    }
                }
            }
        };

        let status = response.status;
        let disposition = descriptor.classifier().classify(&response);
        if disposition != Disposition::Success {
            cmd.transition(CommandState::Classifying, Some(status));
        }
        let next = match disposition {
            Disposition::Success => {
                cmd.transition(CommandState::Decoding, Some(status));
                let out = operation.transform().transform(response);
                cmd.transition(CommandState::Terminal, Some(status));
                return out;
            }
            Disposition::Sentinel(sentinel) => {
                cmd.transition(CommandState::Terminal, Some(status));
                return match T::from_sentinel(sentinel) {
                    Some(v) => Ok(v),
                    None => Err(cmd.protocol_error(&response, false)),
                };
            }
            Disposition::Terminal => {
                cmd.transition(CommandState::Terminal, Some(status));
                return Err(cmd.protocol_error(&response, false));
            }
            Disposition::Redirect => follow_redirect(&mut cmd, &response, retry.as_ref()),
            Disposition::Retryable => {
                let decision = retry.decide(&RetryContext {
                    attempt_no: cmd.attempt,
                    redirects: cmd.redirects,
                    failure: FailureKind::Status {
                        status,
                        headers: &response.headers,
                    },
                    now: SystemTime::now(),
                });
                match decision {
                    RetryDecision::RetryAfter { delay, reason } => {
                        warn!(operation = %cmd.operation, attempt = cmd.attempt, status, ?reason, ?delay, "retrying");
                        cmd.attempt += 1;
                        Next::Resend { delay }
                    }
                    RetryDecision::Stop { reason } => {
                        warn!(operation = %cmd.operation, attempt = cmd.attempt, status, ?reason, "giving up");
                        Next::Done
                    }
                }
            }
        };

        match next {
            Next::Resend { delay } => {
                cmd.transition(CommandState::Retrying, Some(status));
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
            }
            Next::Done => {
                cmd.transition(CommandState::Terminal, Some(status));
                let retryable = matches!(disposition, Disposition::Retryable | Disposition::Redirect);
                return Err(cmd.protocol_error(&response, retryable));
            }
        }
    }
}

/// Rewrites the command's target to `Location`. 303 switches to a bodiless GET.
fn follow_redirect(
    cmd: &mut Command,
    response: &Response,
    retry: &dyn RetryPolicy,
) -> Next {
    let target = response
        .header(LOCATION)
        .and_then(|loc| cmd.request.uri().join(loc).ok());
    let Some(target) = target else {
        return Next::Done;
    };

    let decision = retry.decide(&RetryContext {
        attempt_no: cmd.attempt,
        redirects: cmd.redirects,
        failure: FailureKind::Redirect {
            status: response.status,
        },
        now: SystemTime::now(),
    });
    match decision {
        RetryDecision::RetryAfter { delay, .. } => {
            debug!(operation = %cmd.operation, location = %target, "following redirect");
            cmd.redirects += 1;
            cmd.request.set_uri(target);
            if response.status == 303 && cmd.request.method() != Method::Head {
                cmd.request.set_method(Method::Get);
                cmd.request.clear_payload();
            }
            Next::Resend { delay }
        }
        RetryDecision::Stop { reason } => {
            warn!(operation = %cmd.operation, redirects = cmd.redirects, ?reason, "not following redirect");
            Next::Done
        }
    }
}
