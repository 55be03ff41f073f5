use crate::{decode_response, AgentError, PolicyConfig, StepRequest};
use osrsml_core::{Observation, PolicyResponse};
use std::io::{BufRead, BufReader, Write};
use std::net::{TcpStream, ToSocketAddrs};
use std::time::{Duration, Instant};

/// Longest response line accepted from the server, newline included.
pub const MAX_RESPONSE_BYTES: usize = 64 * 1024;

/// Source of decisions for the control loop.
///
/// Implementations fail closed: any problem yields `None`, which the caller
/// treats as "skip this tick".
pub trait PolicyChannel {
    fn request_action(&mut self, observation: &Observation, reward: f64)
        -> Option<PolicyResponse>;
}

/// One short-lived TCP connection per request, no retries. The timeout bounds
/// the whole exchange, not each individual socket call.
#[derive(Debug, Clone)]
pub struct TcpPolicyClient {
    address: String,
    timeout: Duration,
}

impl TcpPolicyClient {
    pub fn new(address: impl Into<String>, timeout: Duration) -> Self {
        Self {
            address: address.into(),
            timeout,
        }
    }

    pub fn from_config(config: &PolicyConfig) -> Self {
        Self::new(config.address(), config.timeout())
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn exchange(
        &self,
        observation: &Observation,
        reward: f64,
    ) -> Result<PolicyResponse, AgentError> {
        let deadline = Instant::now() + self.timeout;
        let line = StepRequest::step(observation, reward).to_line()?;
        let mut stream = self.connect(deadline)?;
        stream.set_write_timeout(Some(remaining(deadline)?))?;
        stream.write_all(line.as_bytes())?;
        stream.flush()?;

        let response = read_response(BufReader::new(stream), deadline)?;
        decode_response(&response)
    }

    fn connect(&self, deadline: Instant) -> Result<TcpStream, AgentError> {
        let mut last_err = None;
        for addr in self.address.to_socket_addrs()? {
            match TcpStream::connect_timeout(&addr, remaining(deadline)?) {
                Ok(stream) => return Ok(stream),
                Err(err) => last_err = Some(err),
            }
        }
        Err(match last_err {
            Some(err) => err.into(),
            None => AgentError::Protocol(format!("no address for {}", self.address)),
        })
    }
}

fn remaining(deadline: Instant) -> Result<Duration, AgentError> {
    let left = deadline.saturating_duration_since(Instant::now());
    if left.is_zero() {
        return Err(AgentError::Protocol("policy deadline exceeded".to_string()));
    }
    Ok(left)
}

/// Reads one newline-terminated line, re-arming the socket timeout with
/// whatever is left before `deadline` on every read.
fn read_response(
    mut reader: BufReader<TcpStream>,
    deadline: Instant,
) -> Result<String, AgentError> {
    let mut bytes = Vec::new();
    loop {
        reader.get_ref().set_read_timeout(Some(remaining(deadline)?))?;
        let chunk = reader.fill_buf()?;
        if chunk.is_empty() {
            return Err(AgentError::Protocol(
                "connection closed before response".to_string(),
            ));
        }
        let (taken, done) = match chunk.iter().position(|byte| *byte == b'\n') {
            Some(idx) => (idx + 1, true),
            None => (chunk.len(), false),
        };
        if bytes.len() + taken > MAX_RESPONSE_BYTES {
            return Err(AgentError::Protocol(format!(
                "response exceeds {MAX_RESPONSE_BYTES} bytes"
            )));
        }
        bytes.extend_from_slice(&chunk[..taken]);
        reader.consume(taken);
        if done {
            break;
        }
    }
    String::from_utf8(bytes)
        .map_err(|err| AgentError::Protocol(format!("response is not utf-8: {err}")))
}

impl PolicyChannel for TcpPolicyClient {
    fn request_action(
        &mut self,
        observation: &Observation,
        reward: f64,
    ) -> Option<PolicyResponse> {
        match self.exchange(observation, reward) {
            Ok(response) => Some(response),
            Err(err) => {
                tracing::debug!(address = %self.address, error = %err, "policy request failed");
                None
            }
        }
    }
}
