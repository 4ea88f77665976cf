use std::{collections::VecDeque, fmt, rc::Rc};

use crate::{
    assets::atlas::{Atlas, page_textures},
    assets::cache::AssetCaches,
    assets::decode::decode_image,
    assets::sheet::SpriteSheet,
    assets::source::{AssetSource, normalize_rel_path, sibling_path, with_extension},
    foundation::error::{RopelineError, RopelineResult},
    texture::base::{BaseTexture, BaseTextureStatus},
};

/// Terminal notification of a JSON request; called exactly once.
pub type LoadDone = Box<dyn FnOnce(RopelineResult<JsonAsset>)>;

/// What a JSON request turned out to be.
#[derive(Clone, Debug)]
pub enum JsonAsset {
    /// Sprite sheet whose frames are now in the texture cache and whose image has loaded.
    SpriteSheet {
        /// Normalized sheet URL.
        url: String,
        /// Frame names added to the texture cache.
        frames: Vec<String>,
        /// Shared sheet image.
        base: Rc<BaseTexture>,
    },
    /// Skeleton stored in the animation cache; its atlas regions are in the texture cache.
    ///
    /// Atlas page images may still be loading.
    Skeleton {
        /// Normalized skeleton URL (animation cache key).
        url: String,
        /// Atlas URL derived from the skeleton URL.
        atlas_url: String,
        /// Region names added to the texture cache.
        regions: Vec<String>,
    },
    /// Any other JSON document.
    Data {
        /// Normalized URL.
        url: String,
        /// Parsed document.
        value: serde_json::Value,
    },
}

enum Job {
    Image {
        url: String,
        base: Rc<BaseTexture>,
    },
    Json {
        url: String,
        done: LoadDone,
    },
    SheetImage {
        url: String,
        image_url: String,
        frames: Vec<String>,
        base: Rc<BaseTexture>,
        done: LoadDone,
    },
    SkeletonAtlas {
        url: String,
        atlas_url: String,
        skeleton: serde_json::Value,
        done: LoadDone,
    },
}

impl Job {
    fn label(&self) -> &'static str {
        match self {
            Job::Image { .. } => "image",
            Job::Json { .. } => "json",
            Job::SheetImage { .. } => "sheet_image",
            Job::SkeletonAtlas { .. } => "skeleton_atlas",
        }
    }
}

/// Queue-driven asset loader.
///
/// Requests return immediately; the host advances them from its frame loop with
/// [`AssetLoader::poll`] or [`AssetLoader::run_until_idle`]. Chained loads (sheet JSON then
/// sheet image, skeleton JSON then atlas) are queued as follow-up jobs, so a request may take
/// several polls to finish.
pub struct AssetLoader<S> {
    source: S,
    queue: VecDeque<Job>,
}

impl<S> fmt::Debug for AssetLoader<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AssetLoader")
            .field(
                "queue",
                &self.queue.iter().map(Job::label).collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl<S: AssetSource> AssetLoader<S> {
    /// Loader fetching through `source`.
    pub fn new(source: S) -> Self {
        Self {
            source,
            queue: VecDeque::new(),
        }
    }

    /// Byte source.
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Number of queued jobs.
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// True when nothing is queued.
    pub fn is_idle(&self) -> bool {
        self.queue.is_empty()
    }

    /// Request an image. Returns its base texture right away, pending until a later poll.
    ///
    /// Repeated requests for the same path share one base texture and one fetch.
    #[tracing::instrument(skip(self, caches))]
    pub fn load_image(
        &mut self,
        url: &str,
        caches: &mut AssetCaches,
    ) -> RopelineResult<Rc<BaseTexture>> {
        let url = normalize_rel_path(url)?;
        let (base, created) = caches.base_texture_or_pending(&url);
        if created {
            self.queue.push_back(Job::Image {
                url,
                base: base.clone(),
            });
        }
        Ok(base)
    }

    /// Request a JSON document: a sprite sheet (`frames`), a skeleton (`bones`) or plain data.
    ///
    /// An invalid URL is rejected here and `done` is dropped uncalled; otherwise `done` runs
    /// exactly once from a later poll.
    #[tracing::instrument(skip(self, done))]
    pub fn load_json(
        &mut self,
        url: &str,
        done: impl FnOnce(RopelineResult<JsonAsset>) + 'static,
    ) -> RopelineResult<()> {
        let url = normalize_rel_path(url)?;
        self.queue.push_back(Job::Json {
            url,
            done: Box::new(done),
        });
        Ok(())
    }

    /// Run one queued job. Returns `false` when the queue was empty.
    pub fn poll(&mut self, caches: &mut AssetCaches) -> bool {
        let Some(job) = self.queue.pop_front() else {
            return false;
        };
        tracing::trace!(job = job.label(), "running load job");
        match job {
            Job::Image { url, base } => self.run_image(&url, &base),
            Job::Json { url, done } => self.run_json(url, done, caches),
            Job::SheetImage {
                url,
                image_url,
                frames,
                base,
                done,
            } => {
                let result = self.ensure_loaded(&image_url, &base).map(|()| {
                    JsonAsset::SpriteSheet {
                        url,
                        frames,
                        base: base.clone(),
                    }
                });
                done(result);
            }
            Job::SkeletonAtlas {
                url,
                atlas_url,
                skeleton,
                done,
            } => {
                let result = self.run_skeleton_atlas(&url, &atlas_url, skeleton, caches);
                done(result);
            }
        }
        true
    }

    /// Poll until the queue drains, including follow-up jobs. Returns the number of jobs run.
    pub fn run_until_idle(&mut self, caches: &mut AssetCaches) -> usize {
        let mut ran = 0;
        while self.poll(caches) {
            ran += 1;
        }
        ran
    }

    fn run_image(&self, url: &str, base: &BaseTexture) {
        if base.status() != BaseTextureStatus::Pending {
            return;
        }
        if let Err(err) = self.fetch_into(url, base) {
            tracing::warn!(%url, %err, "image load failed");
        }
    }

    /// Settle `base` from `url` if still pending; report its final state.
    fn ensure_loaded(&self, url: &str, base: &BaseTexture) -> RopelineResult<()> {
        match base.status() {
            BaseTextureStatus::Ready(_) => Ok(()),
            BaseTextureStatus::Failed(msg) => Err(RopelineError::asset(msg)),
            BaseTextureStatus::Pending => self.fetch_into(url, base),
        }
    }

    fn fetch_into(&self, url: &str, base: &BaseTexture) -> RopelineResult<()> {
        match self.source.fetch(url).and_then(|bytes| decode_image(&bytes)) {
            Ok(image) => base.resolve(image),
            Err(err) => {
                let msg = format!("load image '{url}': {err}");
                base.fail(msg.clone())?;
                Err(RopelineError::asset(msg))
            }
        }
    }

    fn run_json(&mut self, url: String, done: LoadDone, caches: &mut AssetCaches) {
        let value = match self
            .source
            .fetch(&url)
            .and_then(|bytes| Ok(serde_json::from_slice::<serde_json::Value>(&bytes)?))
        {
            Ok(v) => v,
            Err(err) => {
                done(Err(RopelineError::asset(format!("load json '{url}': {err}"))));
                return;
            }
        };

        if value.get("frames").is_some() {
            match self.start_sheet(&url, value, caches) {
                Ok((image_url, frames, base)) => self.queue.push_back(Job::SheetImage {
                    url,
                    image_url,
                    frames,
                    base,
                    done,
                }),
                Err(err) => done(Err(err)),
            }
        } else if value.get("bones").is_some() {
            match with_extension(&url, "atlas") {
                Ok(atlas_url) => self.queue.push_back(Job::SkeletonAtlas {
                    url,
                    atlas_url,
                    skeleton: value,
                    done,
                }),
                Err(err) => done(Err(err)),
            }
        } else {
            done(Ok(JsonAsset::Data { url, value }));
        }
    }

    /// Parse the sheet, register its frames against the (pending) sheet image.
    fn start_sheet(
        &self,
        url: &str,
        value: serde_json::Value,
        caches: &mut AssetCaches,
    ) -> RopelineResult<(String, Vec<String>, Rc<BaseTexture>)> {
        let sheet = SpriteSheet::from_value(value)?;
        let image = sheet.meta.image.as_deref().ok_or_else(|| {
            RopelineError::validation(format!("sprite sheet '{url}' has no meta.image"))
        })?;
        let image_url = sibling_path(url, image)?;
        let (base, _) = caches.base_texture_or_pending(&image_url);

        let textures = sheet.build_textures(&base)?;
        let mut frames = Vec::with_capacity(textures.len());
        for (name, texture) in textures {
            caches.textures.insert(name.clone(), texture);
            frames.push(name);
        }
        tracing::debug!(%url, %image_url, frames = frames.len(), "sprite sheet parsed");
        Ok((image_url, frames, base))
    }

    fn run_skeleton_atlas(
        &mut self,
        url: &str,
        atlas_url: &str,
        skeleton: serde_json::Value,
        caches: &mut AssetCaches,
    ) -> RopelineResult<JsonAsset> {
        let bytes = self
            .source
            .fetch(atlas_url)
            .map_err(|e| RopelineError::asset(format!("load atlas '{atlas_url}': {e}")))?;
        let text = String::from_utf8(bytes)
            .map_err(|_| RopelineError::asset(format!("atlas '{atlas_url}' is not UTF-8")))?;
        let atlas = Atlas::parse(&text)?;

        let mut regions = Vec::with_capacity(atlas.region_count());
        for page in &atlas.pages {
            let page_url = sibling_path(atlas_url, &page.name)?;
            let (base, created) = caches.base_texture_or_pending(&page_url);
            if created {
                self.queue.push_back(Job::Image {
                    url: page_url,
                    base: base.clone(),
                });
            }
            for (name, texture) in page_textures(page, &base)? {
                caches.textures.insert(name.clone(), texture);
                regions.push(name);
            }
        }

        caches.animations.insert(url, skeleton);
        tracing::debug!(%url, %atlas_url, regions = regions.len(), "skeleton and atlas loaded");
        Ok(JsonAsset::Skeleton {
            url: url.to_string(),
            atlas_url: atlas_url.to_string(),
            regions,
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/loader.rs"]
mod tests;
