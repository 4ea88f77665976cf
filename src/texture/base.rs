use std::{
    cell::RefCell,
    fmt,
    rc::Rc,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
};

use crate::{
    assets::decode::DecodedImage,
    foundation::core::Size,
    foundation::error::{RopelineError, RopelineResult},
};

static NEXT_BASE_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of a [`BaseTexture`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BaseTextureId(u64);

impl BaseTextureId {
    fn next() -> Self {
        Self(NEXT_BASE_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Raw identifier.
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

/// Load state of a base image.
#[derive(Clone, Debug, PartialEq)]
pub enum BaseTextureStatus {
    /// Load requested, size unknown.
    Pending,
    /// Size known; pixels may be absent for size-only textures.
    Ready(Size),
    /// Load failed with the given message.
    Failed(String),
}

type ReadyListener = Box<dyn FnOnce(RopelineResult<Size>)>;

struct BaseTextureState {
    status: BaseTextureStatus,
    pixels: Option<Arc<Vec<u8>>>,
    generation: u64,
    listeners: Vec<ReadyListener>,
}

/// Shared image resource that texture regions slice.
///
/// Created pending by loaders and settled exactly once through [`BaseTexture::resolve`] or
/// [`BaseTexture::fail`]. Single-threaded: shared through `Rc`.
pub struct BaseTexture {
    id: BaseTextureId,
    source: String,
    state: RefCell<BaseTextureState>,
}

impl fmt::Debug for BaseTexture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("BaseTexture")
            .field("id", &self.id)
            .field("source", &self.source)
            .field("status", &state.status)
            .field("generation", &state.generation)
            .field("listeners", &state.listeners.len())
            .finish()
    }
}

impl BaseTexture {
    /// Base texture whose load has not completed yet.
    pub fn pending(source: impl Into<String>) -> Rc<Self> {
        Rc::new(Self::with_status(source.into(), BaseTextureStatus::Pending, None))
    }

    /// Ready base texture of a known size without pixel data.
    pub fn from_size(source: impl Into<String>, size: Size) -> RopelineResult<Rc<Self>> {
        validate_size(size)?;
        Ok(Rc::new(Self::with_status(
            source.into(),
            BaseTextureStatus::Ready(size),
            None,
        )))
    }

    /// Ready base texture backed by decoded pixels.
    pub fn from_image(source: impl Into<String>, image: DecodedImage) -> Rc<Self> {
        let size = image.size();
        Rc::new(Self::with_status(
            source.into(),
            BaseTextureStatus::Ready(size),
            Some(image.rgba8_premul),
        ))
    }

    fn with_status(
        source: String,
        status: BaseTextureStatus,
        pixels: Option<Arc<Vec<u8>>>,
    ) -> Self {
        let generation = u64::from(matches!(status, BaseTextureStatus::Ready(_)));
        Self {
            id: BaseTextureId::next(),
            source,
            state: RefCell::new(BaseTextureState {
                status,
                pixels,
                generation,
                listeners: Vec::new(),
            }),
        }
    }

    /// Identity of this resource.
    pub fn id(&self) -> BaseTextureId {
        self.id
    }

    /// Source path or label given at creation.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Current load status.
    pub fn status(&self) -> BaseTextureStatus {
        self.state.borrow().status.clone()
    }

    /// Image size once ready.
    pub fn size(&self) -> Option<Size> {
        match self.state.borrow().status {
            BaseTextureStatus::Ready(size) => Some(size),
            _ => None,
        }
    }

    /// True once the size is known.
    pub fn is_ready(&self) -> bool {
        self.size().is_some()
    }

    /// Premultiplied RGBA8 pixels, when the texture was decoded from an image.
    pub fn pixels(&self) -> Option<Arc<Vec<u8>>> {
        self.state.borrow().pixels.clone()
    }

    /// Increases each time the texture becomes ready.
    pub fn generation(&self) -> u64 {
        self.state.borrow().generation
    }

    /// Register a one-shot ready/failed listener.
    ///
    /// Fires immediately when the texture has already settled.
    pub fn on_ready(&self, listener: impl FnOnce(RopelineResult<Size>) + 'static) {
        let settled = {
            let mut state = self.state.borrow_mut();
            match state.status.clone() {
                BaseTextureStatus::Pending => {
                    state.listeners.push(Box::new(listener));
                    return;
                }
                BaseTextureStatus::Ready(size) => Ok(size),
                BaseTextureStatus::Failed(msg) => Err(msg),
            }
        };
        listener(settled.map_err(RopelineError::asset));
    }

    /// Settle a pending texture with decoded pixels and notify listeners.
    pub fn resolve(&self, image: DecodedImage) -> RopelineResult<()> {
        let size = image.size();
        validate_size(size)?;
        self.settle(Ok(size), Some(image.rgba8_premul))
    }

    /// Settle a pending texture with a size only.
    pub fn resolve_size(&self, size: Size) -> RopelineResult<()> {
        validate_size(size)?;
        self.settle(Ok(size), None)
    }

    /// Mark the load as failed and notify listeners.
    pub fn fail(&self, msg: impl Into<String>) -> RopelineResult<()> {
        self.settle(Err(msg.into()), None)
    }

    fn settle(
        &self,
        outcome: Result<Size, String>,
        pixels: Option<Arc<Vec<u8>>>,
    ) -> RopelineResult<()> {
        let listeners = {
            let mut state = self.state.borrow_mut();
            if state.status != BaseTextureStatus::Pending {
                return Err(RopelineError::validation(format!(
                    "base texture '{}' already settled",
                    self.source
                )));
            }
            match &outcome {
                Ok(size) => {
                    state.generation += 1;
                    state.status = BaseTextureStatus::Ready(*size);
                }
                Err(msg) => state.status = BaseTextureStatus::Failed(msg.clone()),
            }
            state.pixels = pixels;
            std::mem::take(&mut state.listeners)
        };

        tracing::debug!(
            source = %self.source,
            listeners = listeners.len(),
            ready = outcome.is_ok(),
            "base texture settled"
        );

        for listener in listeners {
            listener(outcome.clone().map_err(RopelineError::asset));
        }
        Ok(())
    }
}

fn validate_size(size: Size) -> RopelineResult<()> {
    let finite = size.width.is_finite() && size.height.is_finite();
    if !finite || size.width <= 0.0 || size.height <= 0.0 {
        return Err(RopelineError::validation(
            "base texture size must be finite and > 0",
        ));
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/texture/base.rs"]
mod tests;
