//! Callback dispatch over a stream of received bytes.
//!
//! The transport feeds bytes through [`CallbackHub::receive`] (or fills its own
//! buffer and calls [`CallbackHub::process_buffer`]). Every complete frame is
//! routed to the handlers registered for its [`MessageKey`], leftover ASCII
//! sentences go to the sentence callback, and the buffer is compacted so the
//! next read appends after any incomplete frame.
//!
//! Consumers on other threads register persistent subscriptions or block in
//! [`CallbackHub::wait_for`]. All handler bookkeeping is serialized by one mutex
//! which is held while handlers run. Calling back into the hub's registration
//! methods from inside a handler therefore deadlocks.

use std::{
    collections::BTreeMap,
    fmt,
    marker::PhantomData,
    sync::{
        mpsc::{self, RecvTimeoutError, SyncSender},
        Mutex, MutexGuard, PoisonError,
    },
    time::Duration,
};

use log::{debug, log_enabled, trace, warn, Level};

use crate::{
    buffer::UnderlyingBuffer,
    error::{ReadError, WaitError},
    nmea,
    reader::FrameReader,
    registry::{Message, MessageRegistry},
    variant::{MessageKey, ProtocolVariant},
};

/// Consumer of frames dispatched under one [`MessageKey`].
///
/// The reader sits on a complete frame; implementations usually call
/// [`FrameReader::read`] with `auto_search = false`.
pub trait FrameHandler: Send {
    fn handle(&mut self, reader: &mut FrameReader<'_>);
}

/// Identifies a registration so it can be removed again
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct HandlerId(u64);

type SentenceCallback = Box<dyn FnMut(&str) + Send>;
type RawHook = Box<dyn FnMut(&[u8]) + Send>;

/// Persistent handler decoding every matching frame as `T`
struct Subscription<T, F> {
    callback: F,
    _message: PhantomData<fn() -> T>,
}

impl<T, F> FrameHandler for Subscription<T, F>
where
    T: Message,
    F: FnMut(T) + Send,
{
    fn handle(&mut self, reader: &mut FrameReader<'_>) {
        match reader.read::<T>(false) {
            Ok(msg) => (self.callback)(msg),
            Err(err) => debug!("subscriber for {} skipped frame: {}", reader.key(), err),
        }
    }
}

/// One-shot handler forwarding the outcome of the first matching frame.
///
/// Decode failures are forwarded as well so the blocked thread wakes up.
struct Waiter<T> {
    tx: SyncSender<Result<T, ReadError>>,
}

impl<T: Message + Send> FrameHandler for Waiter<T> {
    fn handle(&mut self, reader: &mut FrameReader<'_>) {
        // A full channel means an earlier frame already answered this wait
        let _ = self.tx.try_send(reader.read::<T>(false));
    }
}

#[derive(Default)]
struct Handlers {
    next_id: u64,
    by_key: BTreeMap<MessageKey, Vec<(HandlerId, Box<dyn FrameHandler>)>>,
    sentence_callback: Option<SentenceCallback>,
}

impl Handlers {
    fn insert(&mut self, key: MessageKey, handler: Box<dyn FrameHandler>) -> HandlerId {
        let id = HandlerId(self.next_id);
        self.next_id += 1;
        self.by_key.entry(key).or_default().push((id, handler));
        id
    }

    fn remove(&mut self, id: HandlerId) -> bool {
        let Some(key) = self
            .by_key
            .iter()
            .find(|(_, entries)| entries.iter().any(|(entry_id, _)| *entry_id == id))
            .map(|(key, _)| *key)
        else {
            return false;
        };
        if let Some(entries) = self.by_key.get_mut(&key) {
            entries.retain(|(entry_id, _)| *entry_id != id);
            if entries.is_empty() {
                self.by_key.remove(&key);
            }
        }
        true
    }
}

/// Routes frames of one protocol variant to registered handlers.
///
/// ```
/// use std::sync::{Arc, Mutex};
/// use ublox_link::{CallbackHub, DecodeError, Message, MessageRegistry};
///
/// struct AckAck([u8; 2]);
///
/// impl Message for AckAck {
///     const CLASS_ID: u8 = 0x05;
///     const MESSAGE_ID: u32 = 0x01;
///
///     fn decode(payload: &[u8]) -> Result<Self, DecodeError> {
///         let bytes = payload.try_into().map_err(|_| DecodeError::InvalidPayloadLen {
///             packet: "AckAck",
///             expect: 2,
///             got: payload.len(),
///         })?;
///         Ok(Self(bytes))
///     }
/// }
///
/// let mut registry = MessageRegistry::new();
/// registry.register::<AckAck>();
/// let hub = CallbackHub::builder().registry(registry).build();
///
/// let acked = Arc::new(Mutex::new(Vec::new()));
/// let sink = Arc::clone(&acked);
/// hub.subscribe(move |ack: AckAck| sink.lock().unwrap().push(ack.0));
///
/// let mut buffer = Vec::new();
/// hub.receive(&mut buffer, &[0xb5, 0x62, 0x05, 0x01, 0x02, 0x00, 0x06, 0x01, 0x0f, 0x38]);
/// assert_eq!(*acked.lock().unwrap(), [[0x06, 0x01]]);
/// assert!(buffer.is_empty());
/// ```
pub struct CallbackHub {
    variant: ProtocolVariant,
    registry: MessageRegistry,
    handlers: Mutex<Handlers>,
    raw_hook: Mutex<Option<RawHook>>,
}

impl fmt::Debug for CallbackHub {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallbackHub")
            .field("variant", &self.variant)
            .field("registry", &self.registry)
            .field("handlers", &self.handler_count())
            .finish_non_exhaustive()
    }
}

impl CallbackHub {
    pub fn new(variant: ProtocolVariant, registry: MessageRegistry) -> Self {
        Self {
            variant,
            registry,
            handlers: Mutex::default(),
            raw_hook: Mutex::default(),
        }
    }

    pub fn builder() -> CallbackHubBuilder {
        CallbackHubBuilder::default()
    }

    pub fn variant(&self) -> &ProtocolVariant {
        &self.variant
    }

    pub fn registry(&self) -> &MessageRegistry {
        &self.registry
    }

    /// Call `callback` with every successfully decoded `T`
    pub fn subscribe<T, F>(&self, callback: F) -> HandlerId
    where
        T: Message,
        F: FnMut(T) + Send + 'static,
    {
        self.subscribe_with_id(callback, T::MESSAGE_ID)
    }

    /// Like [`subscribe`](Self::subscribe), under `message_id` instead of
    /// `T::MESSAGE_ID`. The registry must list the key for `T`.
    pub fn subscribe_with_id<T, F>(&self, callback: F, message_id: u32) -> HandlerId
    where
        T: Message,
        F: FnMut(T) + Send + 'static,
    {
        let key = MessageKey::new(T::CLASS_ID, message_id);
        if !self.registry.can_decode::<T>(key.class_id, key.message_id) {
            warn!(
                "subscribing {} for {}, which is not registered for it",
                core::any::type_name::<T>(),
                key
            );
        }
        self.add_handler(
            key,
            Box::new(Subscription::<T, F> {
                callback,
                _message: PhantomData,
            }),
        )
    }

    /// Register a custom handler under `key`
    pub fn add_handler(&self, key: MessageKey, handler: Box<dyn FrameHandler>) -> HandlerId {
        self.lock_handlers().insert(key, handler)
    }

    /// Returns `false` if `id` was not registered (anymore)
    pub fn unsubscribe(&self, id: HandlerId) -> bool {
        self.lock_handlers().remove(id)
    }

    /// Replace the callback receiving ASCII sentences found between frames
    pub fn set_sentence_callback<F>(&self, callback: F)
    where
        F: FnMut(&str) + Send + 'static,
    {
        self.lock_handlers().sentence_callback = Some(Box::new(callback));
    }

    /// Replace the hook that sees every received chunk before parsing
    pub fn set_raw_hook<F>(&self, hook: F)
    where
        F: FnMut(&[u8]) + Send + 'static,
    {
        *self.raw_hook.lock().unwrap_or_else(PoisonError::into_inner) = Some(Box::new(hook));
    }

    /// Number of registered frame handlers, waiters included
    pub fn handler_count(&self) -> usize {
        self.lock_handlers().by_key.values().map(Vec::len).sum()
    }

    /// Invoke every handler registered for the frame the reader sits on
    pub fn dispatch(&self, reader: &mut FrameReader<'_>) {
        let key = reader.key();
        if log_enabled!(Level::Trace) {
            if let Some(frame) = reader.frame() {
                trace!("frame {} [{}]: {}", key, frame.len(), HexDump(frame));
            }
        }

        let mut handlers = self.lock_handlers();
        let Some(entries) = handlers.by_key.get_mut(&key) else {
            trace!("no handler for {}", key);
            return;
        };
        for (_, handler) in entries.iter_mut() {
            handler.handle(reader);
        }
    }

    /// Pass every complete sentence in the reader's unused data to the sentence callback
    pub fn extract_sentences(&self, reader: &FrameReader<'_>) {
        if reader.unused_data().is_empty() {
            return;
        }
        let mut handlers = self.lock_handlers();
        let Some(callback) = handlers.sentence_callback.as_mut() else {
            return;
        };
        for sentence in nmea::sentences(reader.unused_data()) {
            callback(&*String::from_utf8_lossy(sentence));
        }
    }

    /// Block until a `T` is dispatched or `timeout` elapses.
    ///
    /// A matching frame that fails validation or decoding ends the wait with
    /// [`WaitError::Read`]. The transient registration is removed before
    /// returning in every case.
    pub fn wait_for<T>(&self, timeout: Duration) -> Result<T, WaitError>
    where
        T: Message + Send,
    {
        let (tx, rx) = mpsc::sync_channel(1);
        let id = self.add_handler(T::key(), Box::new(Waiter::<T> { tx }));
        let outcome = rx.recv_timeout(timeout);
        self.unsubscribe(id);

        let received = match outcome {
            Ok(received) => received,
            // The waiter is gone now, so only a frame that raced the timeout can be left
            Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => {
                rx.try_recv().map_err(|_| {
                    debug!("wait for {} timed out after {:?}", T::key(), timeout);
                    WaitError::Timeout
                })?
            }
        };
        Ok(received?)
    }

    /// Dispatch every complete frame in `buffer`, hand leftover sentences to
    /// the sentence callback, then drop everything before the first incomplete
    /// frame. Returns the number of bytes consumed.
    pub fn process_buffer<B>(&self, buffer: &mut B) -> usize
    where
        B: UnderlyingBuffer + ?Sized,
    {
        let consumed = {
            let mut reader = FrameReader::new(buffer.as_slice(), self.variant, &self.registry);
            let mut frames = 0usize;
            while reader.search() != reader.end() && reader.found() {
                self.dispatch(&mut reader);
                frames += 1;
            }
            self.extract_sentences(&reader);
            trace!(
                "processed {} frames, {} unused bytes, {} bytes pending",
                frames,
                reader.unused_data().len(),
                reader.remaining()
            );
            reader.pos()
        };
        buffer.drain(consumed);
        consumed
    }

    /// Entry point for the transport: pass `chunk` to the raw hook, append it
    /// to `buffer` and process.
    ///
    /// A chunk larger than the free space is appended in parts. If the buffer
    /// is full without holding a complete frame its content is discarded. A
    /// buffer without capacity drops the chunk.
    pub fn receive<B>(&self, buffer: &mut B, chunk: &[u8])
    where
        B: UnderlyingBuffer + ?Sized,
    {
        if let Some(hook) = self
            .raw_hook
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_mut()
        {
            hook(chunk);
        }

        if buffer.max_capacity() == 0 {
            warn!("receive buffer has no capacity, dropping {} bytes", chunk.len());
            return;
        }

        let mut rest = chunk;
        loop {
            let not_copied = buffer.extend_from_slice(rest);
            let copied = rest.len() - not_copied;
            rest = &rest[copied..];
            let consumed = self.process_buffer(buffer);
            if rest.is_empty() {
                break;
            }
            if copied == 0 && consumed == 0 && buffer.is_empty() {
                warn!("receive buffer accepts no data, dropping {} bytes", rest.len());
                break;
            }
            if buffer.len() >= buffer.max_capacity() {
                warn!(
                    "receive buffer full without a complete frame, discarding {} bytes",
                    buffer.len()
                );
                buffer.clear();
            }
        }
    }

    fn lock_handlers(&self) -> MutexGuard<'_, Handlers> {
        self.handlers.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Configuration of a [`CallbackHub`] before it starts processing
#[derive(Default)]
pub struct CallbackHubBuilder {
    variant: ProtocolVariant,
    registry: MessageRegistry,
    raw_hook: Option<RawHook>,
    sentence_callback: Option<SentenceCallback>,
}

impl fmt::Debug for CallbackHubBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallbackHubBuilder")
            .field("variant", &self.variant)
            .field("registry", &self.registry)
            .field("raw_hook", &self.raw_hook.is_some())
            .field("sentence_callback", &self.sentence_callback.is_some())
            .finish()
    }
}

impl CallbackHubBuilder {
    #[must_use]
    pub fn protocol(mut self, variant: ProtocolVariant) -> Self {
        self.variant = variant;
        self
    }

    #[must_use]
    pub fn max_payload_length(mut self, max_payload_length: usize) -> Self {
        self.variant = self.variant.with_max_payload_length(max_payload_length);
        self
    }

    #[must_use]
    pub fn registry(mut self, registry: MessageRegistry) -> Self {
        self.registry = registry;
        self
    }

    #[must_use]
    pub fn raw_hook<F>(mut self, hook: F) -> Self
    where
        F: FnMut(&[u8]) + Send + 'static,
    {
        self.raw_hook = Some(Box::new(hook));
        self
    }

    #[must_use]
    pub fn sentence_callback<F>(mut self, callback: F) -> Self
    where
        F: FnMut(&str) + Send + 'static,
    {
        self.sentence_callback = Some(Box::new(callback));
        self
    }

    pub fn build(self) -> CallbackHub {
        let hub = CallbackHub::new(self.variant, self.registry);
        *hub.raw_hook.lock().unwrap_or_else(PoisonError::into_inner) = self.raw_hook;
        hub.lock_handlers().sentence_callback = self.sentence_callback;
        hub
    }
}

struct HexDump<'a>(&'a [u8]);

impl fmt::Display for HexDump<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, byte) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}
