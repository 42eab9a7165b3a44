use crate::{
	config::TransportConfig,
	queue::OutboundQueue,
	retry::RetryPolicy,
	state::{ConnectionMachine, StateTransition},
	FrameObserver, TransportError,
};
use futures_util::{
	sink::SinkExt,
	stream::{SplitSink, StreamExt},
};
use std::{future, sync::Arc, time::Duration};
use tokio::{
	net::TcpStream,
	sync::mpsc,
	time::{interval_at, Instant, MissedTickBehavior},
};
use tokio_tungstenite::{connect_async, tungstenite::protocol::Message, MaybeTlsStream, WebSocketStream};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;
type WsSink = SplitSink<WsStream, Message>;

#[derive(Debug)]
pub enum Command {
	Send(String),
	Retarget(Option<String>),
}

/// Why a connection (or a wait between connections) ended
#[derive(Debug)]
enum Exit {
	Lost(String),
	Retarget(Option<String>),
	Shutdown,
}

/// Owns the socket, the outbound queue and the retry counter.
///
/// Runs as a single task; every write to transport state happens here.
pub struct Driver {
	target: Option<String>,
	config: TransportConfig,
	queue: OutboundQueue,
	retry: RetryPolicy,
	commands: mpsc::UnboundedReceiver<Command>,
	machine: ConnectionMachine,
	observer: Arc<dyn FrameObserver>,
	cancel: CancellationToken,
}

impl Driver {
	pub fn new(
		target: Option<String>,
		config: TransportConfig,
		commands: mpsc::UnboundedReceiver<Command>,
		machine: ConnectionMachine,
		observer: Arc<dyn FrameObserver>,
		cancel: CancellationToken,
	) -> Self {
		Self {
			target,
			queue: OutboundQueue::new(config.max_queue_size),
			retry: RetryPolicy::new(config.backoff.clone()),
			config,
			commands,
			machine,
			observer,
			cancel,
		}
	}

	pub async fn run(mut self) {
		loop {
			let Some(url) = self.target.clone() else {
				self.transition(StateTransition::Park);
				match self.wait(None).await {
					Exit::Retarget(target) => {
						self.retarget(target);
						continue;
					}
					Exit::Shutdown => break,
					Exit::Lost(_) => continue,
				}
			};

			let exit = match self.connect(&url).await {
				Ok(stream) => self.serve(stream).await,
				Err(exit) => exit,
			};

			let exit = match exit {
				Exit::Lost(reason) => {
					warn!(%url, %reason, queued = self.queue.len(), "live connection lost");
					self.settle(reason);
					let delay = self.retry.next_delay();
					debug!(?delay, attempt = self.retry.attempts(), "scheduling reconnect");
					self.wait(Some(delay)).await
				}
				other => other,
			};

			match exit {
				Exit::Lost(_) => {}
				Exit::Retarget(target) => {
					self.settle("retargeted".to_string());
					self.retarget(target);
				}
				Exit::Shutdown => break,
			}
		}

		self.settle("shutdown".to_string());
		self.transition(StateTransition::Park);
		debug!(dropped = self.queue.dropped(), unsent = self.queue.len(), "transport driver stopped");
	}

	fn retarget(&mut self, target: Option<String>) {
		info!(target = ?target, "live transport retargeted");
		self.target = target;
		self.retry.reset();
	}

	fn transition(&self, transition: StateTransition) {
		match self.machine.apply(transition) {
			Ok(state) => self.observer.on_state(&state),
			Err(e) => debug!("{e}"),
		}
	}

	/// Close out whatever socket state we are in, if any
	fn settle(&self, reason: String) {
		if self.machine.current().is_active() {
			self.transition(StateTransition::ConnectionLost(reason));
		}
	}

	fn enqueue(&mut self, frame: String) {
		let evicted = self.queue.push(frame);
		if evicted > 0 {
			warn!(evicted, capacity = self.queue.capacity(), "outbound queue full, dropped oldest frames");
		} else {
			debug!(queued = self.queue.len(), "frame queued until connected");
		}
	}

	/// Sleep for `delay` (forever when `None`) while still queueing sends
	async fn wait(&mut self, delay: Option<Duration>) -> Exit {
		let cancel = self.cancel.clone();
		let sleep = async move {
			match delay {
				Some(delay) => tokio::time::sleep(delay).await,
				None => future::pending::<()>().await,
			}
		};
		tokio::pin!(sleep);

		loop {
			tokio::select! {
				() = cancel.cancelled() => return Exit::Shutdown,
				() = &mut sleep => return Exit::Lost("retry".to_string()),
				command = self.commands.recv() => match command {
					Some(Command::Send(frame)) => self.enqueue(frame),
					Some(Command::Retarget(target)) => return Exit::Retarget(target),
					None => return Exit::Shutdown,
				},
			}
		}
	}

	async fn connect(&mut self, url: &str) -> Result<WsStream, Exit> {
		self.transition(StateTransition::StartConnecting { attempt: self.retry.attempts() });
		debug!(%url, attempt = self.retry.attempts(), "connecting");

		let cancel = self.cancel.clone();
		let handshake = connect_async(url);
		tokio::pin!(handshake);

		loop {
			tokio::select! {
				() = cancel.cancelled() => return Err(Exit::Shutdown),
				result = &mut handshake => {
					return match result {
						Ok((stream, _response)) => Ok(stream),
						Err(e) => {
							let reason = e.to_string();
							self.observer.on_error(&TransportError::Handshake { url: url.to_string(), reason: reason.clone() });
							Err(Exit::Lost(reason))
						}
					};
				}
				command = self.commands.recv() => match command {
					Some(Command::Send(frame)) => self.enqueue(frame),
					Some(Command::Retarget(target)) => return Err(Exit::Retarget(target)),
					None => return Err(Exit::Shutdown),
				},
			}
		}
	}

	/// Write queued frames in FIFO order; a failed frame goes back to the head
	async fn flush(&mut self, sink: &mut WsSink) -> Result<usize, String> {
		let mut flushed = 0;
		while let Some(frame) = self.queue.pop() {
			if let Err(e) = sink.send(Message::Text(frame.clone().into())).await {
				self.queue.requeue(frame);
				return Err(e.to_string());
			}
			flushed += 1;
		}
		Ok(flushed)
	}

	async fn serve(&mut self, stream: WsStream) -> Exit {
		let (mut sink, mut source) = stream.split();

		self.retry.reset();
		match self.flush(&mut sink).await {
			Ok(0) => {}
			Ok(flushed) => debug!(flushed, "flushed queued frames"),
			Err(reason) => return Exit::Lost(reason),
		}
		self.transition(StateTransition::ConnectionEstablished);
		info!(url = ?self.target, "live connection open");

		let cancel = self.cancel.clone();
		let period = self.config.keepalive_interval;
		let mut keepalive = interval_at(Instant::now() + period, period);
		keepalive.set_missed_tick_behavior(MissedTickBehavior::Skip);
		let mut last_activity = Instant::now();

		let exit = loop {
			tokio::select! {
				() = cancel.cancelled() => break Exit::Shutdown,
				message = source.next() => match message {
					Some(Ok(Message::Text(text))) => {
						last_activity = Instant::now();
						self.observer.on_frame(text.as_str());
					}
					Some(Ok(Message::Binary(data))) => {
						last_activity = Instant::now();
						match std::str::from_utf8(&data) {
							Ok(text) => self.observer.on_frame(text),
							Err(e) => {
								warn!("dropping non-UTF-8 binary frame: {e}");
								self.observer.on_error(&TransportError::MalformedFrame(e.to_string()));
							}
						}
					}
					Some(Ok(Message::Ping(_) | Message::Pong(_))) => last_activity = Instant::now(),
					Some(Ok(Message::Close(frame))) => break Exit::Lost(format!("closed by peer: {frame:?}")),
					Some(Ok(Message::Frame(_))) => {}
					Some(Err(e)) => {
						self.observer.on_error(&TransportError::Socket(e.to_string()));
						break Exit::Lost(e.to_string());
					}
					None => break Exit::Lost("stream ended".to_string()),
				},
				command = self.commands.recv() => match command {
					Some(Command::Send(frame)) => {
						if let Err(e) = sink.send(Message::Text(frame.clone().into())).await {
							self.queue.push(frame);
							break Exit::Lost(e.to_string());
						}
					}
					Some(Command::Retarget(target)) => break Exit::Retarget(target),
					None => break Exit::Shutdown,
				},
				_ = keepalive.tick() => {
					if last_activity.elapsed() > self.config.idle_timeout {
						break Exit::Lost(format!("no activity for {:?}", self.config.idle_timeout));
					}
					if let Err(e) = sink.send(Message::Ping(Default::default())).await {
						break Exit::Lost(format!("ping failed: {e}"));
					}
				}
			}
		};

		if !matches!(exit, Exit::Lost(_)) {
			self.transition(StateTransition::StartClosing);
			if let Err(e) = sink.close().await {
				debug!("error while closing socket: {e}");
			}
		}

		exit
	}
}
