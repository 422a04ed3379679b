//! Tagged texture registry
//!
//! Decodes image files into RGBA bitmaps, hands them to a [`TextureDevice`]
//! for upload and remembers the resulting handles under string tags. The
//! registration index of a texture is also the texture unit it is bound to,
//! so the registry never holds more entries than there are units.

use std::path::Path;

use image::{DynamicImage, RgbaImage};

use crate::error::LoadError;

/// Number of texture units the scene shader exposes.
pub const MAX_TEXTURE_UNITS: usize = 16;

/// Texture unit a registered texture is bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureSlot(u32);

impl TextureSlot {
    pub fn unit(self) -> u32 {
        self.0
    }
}

/// Decoded image ready for upload.
///
/// Rows are stored bottom-up (the decoded image is flipped vertically) so that
/// texture coordinate v = 0 addresses the bottom of the picture. Pixels are
/// always expanded to RGBA8; `channels` keeps the channel count of the source.
#[derive(Debug, Clone)]
pub struct Bitmap {
    pub channels: u8,
    pub pixels: RgbaImage,
}

impl Bitmap {
    /// Decodes an encoded image (PNG or JPEG)
    ///
    /// # Arguments
    /// * `bytes` - Encoded file contents
    /// * `label` - Name used in errors and logs, usually the file path
    pub fn decode(bytes: &[u8], label: &str) -> Result<Self, LoadError> {
        let image = image::load_from_memory(bytes).map_err(|source| LoadError::Decode {
            label: label.to_string(),
            source,
        })?;
        Self::from_image(image, label)
    }

    /// Wraps an already decoded image, applying the same channel check and flip
    pub fn from_image(image: DynamicImage, label: &str) -> Result<Self, LoadError> {
        let channels = image.color().channel_count();
        if channels != 3 && channels != 4 {
            return Err(LoadError::UnsupportedChannels {
                label: label.to_string(),
                channels,
            });
        }

        Ok(Self {
            channels,
            pixels: image.flipv().to_rgba8(),
        })
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn has_alpha(&self) -> bool {
        self.channels == 4
    }
}

/// GPU side of texture management.
pub trait TextureDevice {
    type Handle;

    /// Uploads a bitmap with mipmaps, repeat wrapping and linear filtering.
    fn create_texture(&mut self, bitmap: &Bitmap, label: &str) -> Result<Self::Handle, LoadError>;

    /// Makes `handle` visible to the shader through texture unit `unit`.
    fn bind_texture_unit(&mut self, unit: u32, handle: &Self::Handle);

    /// Frees the GPU memory behind `handle`.
    fn release_texture(&mut self, handle: Self::Handle);

    /// Number of texture units this device can bind at once.
    fn max_texture_units(&self) -> usize {
        MAX_TEXTURE_UNITS
    }
}

#[derive(Debug)]
pub struct TextureEntry<H> {
    pub tag: String,
    pub handle: H,
    pub width: u32,
    pub height: u32,
    pub channels: u8,
}

/// Ordered list of uploaded textures, looked up by tag
///
/// Lookups return the first texture registered under a tag.
#[derive(Debug)]
pub struct TextureRegistry<H> {
    entries: Vec<TextureEntry<H>>,
    capacity: usize,
}

impl<H> Default for TextureRegistry<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H> TextureRegistry<H> {
    pub fn new() -> Self {
        Self::with_capacity(MAX_TEXTURE_UNITS)
    }

    /// Registry that accepts at most `capacity` textures (never more than
    /// [`MAX_TEXTURE_UNITS`])
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::new(),
            capacity: capacity.min(MAX_TEXTURE_UNITS),
        }
    }

    /// Reads, decodes and uploads an image file, registering it under `tag`
    ///
    /// Failures are logged and returned; the registry is unchanged on error.
    pub fn load<D>(&mut self, device: &mut D, path: impl AsRef<Path>, tag: &str) -> Result<(), LoadError>
    where
        D: TextureDevice<Handle = H> + ?Sized,
    {
        let path = path.as_ref();
        self.ensure_capacity(tag)?;

        let bytes = std::fs::read(path).map_err(|source| {
            log::warn!("Could not load image:{}", path.display());
            LoadError::Io {
                path: path.to_path_buf(),
                source,
            }
        })?;

        self.load_from_memory(device, &bytes, &path.display().to_string(), tag)
    }

    /// Decodes and uploads an in-memory encoded image under `tag`
    pub fn load_from_memory<D>(
        &mut self,
        device: &mut D,
        bytes: &[u8],
        label: &str,
        tag: &str,
    ) -> Result<(), LoadError>
    where
        D: TextureDevice<Handle = H> + ?Sized,
    {
        self.ensure_capacity(tag)?;

        let bitmap = Bitmap::decode(bytes, label).map_err(|err| {
            match &err {
                LoadError::UnsupportedChannels { channels, .. } => {
                    log::warn!("Not implemented to handle image with {} channels", channels)
                }
                _ => log::warn!("Could not load image:{}", label),
            }
            err
        })?;

        self.register(device, bitmap, label, tag)
    }

    /// Uploads an already decoded bitmap under `tag`
    pub fn register<D>(&mut self, device: &mut D, bitmap: Bitmap, label: &str, tag: &str) -> Result<(), LoadError>
    where
        D: TextureDevice<Handle = H> + ?Sized,
    {
        self.ensure_capacity(tag)?;

        if self.lookup(tag).is_some() {
            log::warn!(
                "Texture tag '{}' is already registered, lookups keep returning the first one",
                tag
            );
        }

        let handle = device.create_texture(&bitmap, label)?;
        log::info!(
            "Successfully loaded image:{}, width:{}, height:{}, channels:{}",
            label,
            bitmap.width(),
            bitmap.height(),
            bitmap.channels
        );

        self.entries.push(TextureEntry {
            tag: tag.to_string(),
            handle,
            width: bitmap.width(),
            height: bitmap.height(),
            channels: bitmap.channels,
        });
        Ok(())
    }

    fn ensure_capacity(&self, tag: &str) -> Result<(), LoadError> {
        if self.entries.len() >= self.capacity {
            log::warn!(
                "Could not register texture '{}': all {} texture units are in use",
                tag,
                self.capacity
            );
            return Err(LoadError::CapacityExceeded {
                tag: tag.to_string(),
                capacity: self.capacity,
            });
        }
        Ok(())
    }

    /// Gets the handle registered under `tag`
    pub fn lookup(&self, tag: &str) -> Option<&H> {
        self.entry(tag).map(|e| &e.handle)
    }

    /// Gets the texture unit of the texture registered under `tag`
    pub fn slot(&self, tag: &str) -> Option<TextureSlot> {
        self.entries
            .iter()
            .position(|e| e.tag == tag)
            .map(|index| TextureSlot(index as u32))
    }

    pub fn entry(&self, tag: &str) -> Option<&TextureEntry<H>> {
        self.entries.iter().find(|e| e.tag == tag)
    }

    /// Binds every registered texture to the unit equal to its index
    ///
    /// # Returns
    /// Number of units bound
    pub fn bind_all<D>(&self, device: &mut D) -> usize
    where
        D: TextureDevice<Handle = H> + ?Sized,
    {
        let units = self.capacity.min(device.max_texture_units());
        let mut bound = 0;
        for (unit, entry) in self.entries.iter().enumerate().take(units) {
            device.bind_texture_unit(unit as u32, &entry.handle);
            bound += 1;
        }
        bound
    }

    /// Releases every GPU texture and empties the registry
    pub fn destroy<D>(&mut self, device: &mut D)
    where
        D: TextureDevice<Handle = H> + ?Sized,
    {
        for entry in self.entries.drain(..) {
            log::debug!("Releasing texture '{}'", entry.tag);
            device.release_texture(entry.handle);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn iter(&self) -> impl Iterator<Item = &TextureEntry<H>> {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgb, RgbImage};
    use std::io::Cursor;

    #[derive(Default)]
    struct FakeDevice {
        next_handle: u32,
        bound: Vec<(u32, u32)>,
        released: Vec<u32>,
        uploads: Vec<(u32, u32, u8)>,
    }

    impl TextureDevice for FakeDevice {
        type Handle = u32;

        fn create_texture(&mut self, bitmap: &Bitmap, _label: &str) -> Result<u32, LoadError> {
            self.uploads
                .push((bitmap.width(), bitmap.height(), bitmap.channels));
            self.next_handle += 1;
            Ok(self.next_handle)
        }

        fn bind_texture_unit(&mut self, unit: u32, handle: &u32) {
            self.bound.push((unit, *handle));
        }

        fn release_texture(&mut self, handle: u32) {
            self.released.push(handle);
        }
    }

    fn encode(image: DynamicImage) -> Vec<u8> {
        let mut bytes = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        bytes
    }

    fn rgb_png(width: u32, height: u32) -> Vec<u8> {
        encode(DynamicImage::ImageRgb8(RgbImage::new(width, height)))
    }

    #[test]
    fn test_load_registers_in_order() {
        let mut device = FakeDevice::default();
        let mut registry = TextureRegistry::new();

        registry
            .load_from_memory(&mut device, &rgb_png(4, 2), "a.png", "a")
            .unwrap();
        registry
            .load_from_memory(&mut device, &rgb_png(8, 8), "b.png", "b")
            .unwrap();

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.slot("a"), Some(TextureSlot(0)));
        assert_eq!(registry.slot("b"), Some(TextureSlot(1)));
        assert_eq!(registry.lookup("b"), Some(&2));
        assert_eq!(device.uploads, vec![(4, 2, 3), (8, 8, 3)]);

        let entry = registry.entry("a").unwrap();
        assert_eq!((entry.width, entry.height, entry.channels), (4, 2, 3));
    }

    #[test]
    fn test_unsupported_channels_are_rejected() {
        let mut device = FakeDevice::default();
        let mut registry = TextureRegistry::new();
        let gray = encode(DynamicImage::ImageLuma8(image::GrayImage::new(2, 2)));

        let err = registry
            .load_from_memory(&mut device, &gray, "gray.png", "gray")
            .unwrap_err();

        assert!(matches!(err, LoadError::UnsupportedChannels { channels: 1, .. }));
        assert!(registry.is_empty());
        assert!(device.uploads.is_empty());
    }

    #[test]
    fn test_garbage_bytes_fail_to_decode() {
        let mut device = FakeDevice::default();
        let mut registry = TextureRegistry::new();

        let err = registry
            .load_from_memory(&mut device, b"not an image", "junk", "junk")
            .unwrap_err();

        assert!(matches!(err, LoadError::Decode { .. }));
        assert!(registry.lookup("junk").is_none());
    }

    #[test]
    fn test_missing_file_is_an_io_error() {
        let mut device = FakeDevice::default();
        let mut registry = TextureRegistry::new();

        let err = registry
            .load(&mut device, "does/not/exist.png", "missing")
            .unwrap_err();

        assert!(matches!(err, LoadError::Io { .. }));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_capacity_is_enforced() {
        let mut device = FakeDevice::default();
        let mut registry = TextureRegistry::new();
        let png = rgb_png(1, 1);

        for i in 0..MAX_TEXTURE_UNITS {
            registry
                .load_from_memory(&mut device, &png, "t.png", &format!("t{}", i))
                .unwrap();
        }

        let err = registry
            .load_from_memory(&mut device, &png, "t.png", "overflow")
            .unwrap_err();
        assert!(matches!(
            err,
            LoadError::CapacityExceeded {
                capacity: MAX_TEXTURE_UNITS,
                ..
            }
        ));
        assert_eq!(registry.len(), MAX_TEXTURE_UNITS);
        assert_eq!(registry.bind_all(&mut device), MAX_TEXTURE_UNITS);
    }

    #[test]
    fn test_with_capacity_never_exceeds_unit_count() {
        let registry = TextureRegistry::<u32>::with_capacity(64);
        assert_eq!(registry.capacity(), MAX_TEXTURE_UNITS);
    }

    #[test]
    fn test_bind_all_uses_registration_index() {
        let mut device = FakeDevice::default();
        let mut registry = TextureRegistry::new();
        let png = rgb_png(1, 1);
        for tag in ["esdmat", "pcba", "solder"] {
            registry
                .load_from_memory(&mut device, &png, tag, tag)
                .unwrap();
        }

        assert_eq!(registry.bind_all(&mut device), 3);
        assert_eq!(device.bound, vec![(0, 1), (1, 2), (2, 3)]);
    }

    #[test]
    fn test_duplicate_tag_first_match_wins() {
        let mut device = FakeDevice::default();
        let mut registry = TextureRegistry::new();
        let png = rgb_png(1, 1);

        registry.load_from_memory(&mut device, &png, "x", "dup").unwrap();
        registry.load_from_memory(&mut device, &png, "y", "dup").unwrap();

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.lookup("dup"), Some(&1));
        assert_eq!(registry.slot("dup"), Some(TextureSlot(0)));
    }

    #[test]
    fn test_destroy_releases_every_handle() {
        let mut device = FakeDevice::default();
        let mut registry = TextureRegistry::new();
        let png = rgb_png(1, 1);
        registry.load_from_memory(&mut device, &png, "a", "a").unwrap();
        registry.load_from_memory(&mut device, &png, "b", "b").unwrap();

        registry.destroy(&mut device);

        assert_eq!(device.released, vec![1, 2]);
        assert!(registry.is_empty());
        assert!(registry.lookup("a").is_none());
    }

    #[test]
    fn test_bitmap_is_flipped_vertically() {
        let mut image = RgbImage::new(1, 2);
        image.put_pixel(0, 0, Rgb([255, 0, 0]));
        image.put_pixel(0, 1, Rgb([0, 0, 255]));

        let bitmap = Bitmap::from_image(DynamicImage::ImageRgb8(image), "flip").unwrap();

        assert_eq!(bitmap.pixels.get_pixel(0, 0).0, [0, 0, 255, 255]);
        assert_eq!(bitmap.pixels.get_pixel(0, 1).0, [255, 0, 0, 255]);
        assert!(!bitmap.has_alpha());
    }

    #[test]
    fn test_rgba_source_keeps_four_channels() {
        let image = DynamicImage::ImageRgba8(RgbaImage::new(2, 2));
        let bitmap = Bitmap::decode(&encode(image), "rgba.png").unwrap();
        assert_eq!(bitmap.channels, 4);
        assert!(bitmap.has_alpha());
    }
}
