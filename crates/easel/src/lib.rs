//! Easel - build Visio stencils from a folder of images.
//!
//! Every input image becomes one stencil master: a foreign (bitmap) shape
//! scaled to a configured physical area, carrying the configured connection
//! points. The result is a `.vssx` package, an Open Packaging Conventions ZIP
//! container.

pub mod assemble;
pub mod raster;
pub mod render;
pub mod schema;
pub mod template;
pub mod thumbnail;

mod error;

pub use easel_core::{config, master, ordering, request, scale};

pub use assemble::{SkipReason, SkippedImage, StencilReport};
pub use error::EaselError;

use std::{fs, path::Path};

use log::info;

use assemble::Assembler;
use config::StencilConfig;
use raster::{FileRasterDecoder, RasterDecoder};
use request::StencilRequest;
use template::BaseTemplate;
use thumbnail::{BmpThumbnailEncoder, ThumbnailEncoder};

/// Builder for turning a set of images into a stencil.
///
/// # Examples
///
/// ```rust,no_run
/// use easel::{StencilBuilder, config::StencilConfig, request::StencilRequest};
///
/// let request: StencilRequest = ["icons/router.png", "icons/switch.png"].iter().collect();
///
/// let builder = StencilBuilder::new(StencilConfig::default());
/// let stencil = builder.build(&request).expect("Failed to build stencil");
///
/// stencil.write_to("network.vssx").expect("Failed to write stencil");
/// println!("{} masters", stencil.report().masters().len());
/// ```
pub struct StencilBuilder {
    config: StencilConfig,
    template: BaseTemplate,
    decoder: Box<dyn RasterDecoder>,
    thumbnails: Box<dyn ThumbnailEncoder>,
}

impl StencilBuilder {
    /// Create a builder using the built-in template and the file-system codecs.
    ///
    /// # Arguments
    ///
    /// * `config` - Target area and connection points for every master
    pub fn new(config: StencilConfig) -> Self {
        Self {
            config,
            template: BaseTemplate::builtin(),
            decoder: Box::new(FileRasterDecoder),
            thumbnails: Box::new(BmpThumbnailEncoder),
        }
    }

    /// Use a different base container.
    pub fn with_template(mut self, template: BaseTemplate) -> Self {
        self.template = template;
        self
    }

    /// Use a different image decoder.
    pub fn with_decoder(mut self, decoder: impl RasterDecoder + 'static) -> Self {
        self.decoder = Box::new(decoder);
        self
    }

    /// Use a different thumbnail encoder.
    pub fn with_thumbnail_encoder(mut self, encoder: impl ThumbnailEncoder + 'static) -> Self {
        self.thumbnails = Box::new(encoder);
        self
    }

    /// Build a stencil from the images in `request`.
    ///
    /// Images are processed in case-insensitive name order. Images that
    /// cannot be decoded or sized are skipped and listed in the report.
    ///
    /// # Errors
    ///
    /// Returns `EaselError` for an invalid configuration, an empty request,
    /// an unusable template, a run in which every image was skipped, or a
    /// failure while writing the package.
    pub fn build(&self, request: &StencilRequest) -> Result<Stencil, EaselError> {
        info!(
            images = request.len(),
            target_area = self.config.target_area(),
            connections = self.config.connections().len();
            "Building stencil"
        );

        self.config.validate()?;
        let candidates = ordering::order_images(request)?;

        let mut assembler = Assembler::open(&self.template)?.begin();
        for candidate in &candidates {
            assembler.add_image(
                candidate,
                &self.config,
                self.decoder.as_ref(),
                self.thumbnails.as_ref(),
            )?;
        }
        let (bytes, report) = assembler.finalize()?.seal()?;

        info!(
            masters = report.masters().len(),
            skipped = report.skipped().len(),
            bytes = bytes.len();
            "Stencil built"
        );
        Ok(Stencil { bytes, report })
    }
}

impl Default for StencilBuilder {
    fn default() -> Self {
        Self::new(StencilConfig::default())
    }
}

/// A sealed stencil package and the report of the run that built it.
#[derive(Debug)]
pub struct Stencil {
    bytes: Vec<u8>,
    report: StencilReport,
}

impl Stencil {
    /// The `.vssx` package bytes.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn report(&self) -> &StencilReport {
        &self.report
    }

    /// Write the package to `path`.
    pub fn write_to(&self, path: impl AsRef<Path>) -> Result<(), EaselError> {
        fs::write(path, &self.bytes)?;
        Ok(())
    }
}
