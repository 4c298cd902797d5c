//! Package assembly.
//!
//! The assembler owns the package for a whole run and moves through three
//! states, each a distinct type so operations cannot be called out of order:
//!
//! 1. [`Opened`]: the template is loaded and the masters index part exists.
//! 2. [`Populating`]: masters are added one candidate at a time, in ID order.
//! 3. [`Finalized`]: app properties, masters index and the document link are
//!    written; the only thing left is to seal the package.

use std::path::{Path, PathBuf};

use easel_core::{
    config::StencilConfig,
    master::{Master, MasterId},
    ordering::Candidate,
    scale::{ScaleError, scale_to_area},
};
use easel_opc::{Package, PartName, TargetMode};
use log::{debug, info, warn};
use thiserror::Error;

use crate::{
    EaselError,
    raster::{RasterDecoder, RasterError, encode_png},
    render::{self, MasterEntry},
    schema::{self, content_type, part, rel_type},
    template::BaseTemplate,
    thumbnail::ThumbnailEncoder,
};

/// Why an image produced no master.
#[derive(Debug, Error)]
pub enum SkipReason {
    #[error(transparent)]
    Raster(#[from] RasterError),

    #[error(transparent)]
    Scale(#[from] ScaleError),
}

/// An input image that produced no master. Its ID is not reused.
#[derive(Debug)]
pub struct SkippedImage {
    id: MasterId,
    path: PathBuf,
    reason: SkipReason,
}

impl SkippedImage {
    pub fn id(&self) -> MasterId {
        self.id
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn reason(&self) -> &SkipReason {
        &self.reason
    }
}

/// Summary of a run: the masters written and the images skipped.
#[derive(Debug, Default)]
pub struct StencilReport {
    masters: Vec<Master>,
    skipped: Vec<SkippedImage>,
}

impl StencilReport {
    /// Produced masters, in ID order.
    pub fn masters(&self) -> &[Master] {
        &self.masters
    }

    /// Skipped images, in ID order.
    pub fn skipped(&self) -> &[SkippedImage] {
        &self.skipped
    }

    /// IDs of masters written without a thumbnail, and so missing from the masters index.
    pub fn missing_thumbnails(&self) -> impl Iterator<Item = MasterId> + '_ {
        self.masters
            .iter()
            .filter(|master| master.thumbnail().is_none())
            .map(Master::id)
    }
}

/// Template loaded; no master added yet.
#[derive(Debug)]
pub struct Opened;

/// Masters are being added.
#[derive(Debug, Default)]
pub struct Populating {
    report: StencilReport,
}

/// All parts written; ready to seal.
#[derive(Debug)]
pub struct Finalized {
    report: StencilReport,
}

/// Builds a stencil package, one state at a time.
#[derive(Debug)]
pub struct Assembler<S> {
    package: Package,
    document: PartName,
    masters_index: PartName,
    state: S,
}

impl Assembler<Opened> {
    /// Opens `template` and makes sure it has a masters index part.
    ///
    /// # Errors
    ///
    /// Returns [`EaselError::TemplateLoad`] for an unusable template.
    pub fn open(template: &BaseTemplate) -> Result<Self, EaselError> {
        let mut package = template.open()?;
        let document = PartName::new(part::DOCUMENT)?;
        let masters_index = PartName::new(part::MASTERS)?;

        if !package.contains(&masters_index) {
            package.create_part(masters_index.clone(), content_type::MASTERS, Vec::new())?;
        }

        info!("Template opened");
        Ok(Self {
            package,
            document,
            masters_index,
            state: Opened,
        })
    }

    /// Starts adding masters.
    pub fn begin(self) -> Assembler<Populating> {
        Assembler {
            package: self.package,
            document: self.document,
            masters_index: self.masters_index,
            state: Populating::default(),
        }
    }
}

impl Assembler<Populating> {
    /// Adds the master for one candidate image.
    ///
    /// An image that cannot be decoded, sized or re-encoded is skipped: it is
    /// logged, recorded in the report and leaves no part or relationship
    /// behind. A failed thumbnail only keeps the master out of the masters
    /// index.
    ///
    /// # Errors
    ///
    /// Only package and rendering failures are returned; they abort the run.
    pub fn add_image(
        &mut self,
        candidate: &Candidate,
        config: &StencilConfig,
        decoder: &dyn RasterDecoder,
        thumbnails: &dyn ThumbnailEncoder,
    ) -> Result<(), EaselError> {
        let id = candidate.id();
        let path = candidate.path();

        let prepared = decoder
            .decode(path)
            .map_err(SkipReason::from)
            .and_then(|decoded| {
                let size = scale_to_area(
                    decoded.width(),
                    decoded.height(),
                    decoded.resolution(),
                    config.target_area(),
                )?;
                let png = encode_png(decoded.image())?;
                Ok((size, png))
            });
        let (size, png) = match prepared {
            Ok(prepared) => prepared,
            Err(reason) => {
                warn!(id = id.get(), path:? = path, reason:%; "Skipping image");
                self.state.report.skipped.push(SkippedImage {
                    id,
                    path: path.to_path_buf(),
                    reason,
                });
                return Ok(());
            }
        };

        let thumbnail = thumbnails.encode(path).into_option();
        if thumbnail.is_none() {
            warn!(id = id.get(), path:? = path; "No thumbnail, master left out of the masters index");
        }
        let master = Master::new(id, path, size).with_thumbnail(thumbnail);

        let image_part = part::image(id)?;
        let master_part = part::master(id)?;
        let master_xml =
            render::render_master(&master, config.connections()).map_err(EaselError::Render)?;

        self.package.create_part(image_part.clone(), content_type::PNG, png)?;
        self.package
            .create_part(master_part.clone(), content_type::MASTER, master_xml)?;
        self.package.add_relationship(
            &master_part,
            &image_part,
            rel_type::IMAGE,
            Some(schema::MASTER_IMAGE_REL_ID),
            TargetMode::Internal,
        )?;
        self.package.add_relationship(
            &self.masters_index,
            &master_part,
            rel_type::MASTER,
            Some(&schema::master_rel_id(id)),
            TargetMode::Internal,
        )?;

        debug!(
            id = id.get(),
            name = master.display_name(),
            width = size.width(),
            height = size.height();
            "Master added"
        );
        self.state.report.masters.push(master);
        Ok(())
    }

    /// Writes the aggregate parts and links the masters index to the document.
    ///
    /// # Errors
    ///
    /// Returns [`EaselError::NoMastersProduced`] when every image was skipped.
    pub fn finalize(mut self) -> Result<Assembler<Finalized>, EaselError> {
        let report = std::mem::take(&mut self.state.report);
        if report.masters.is_empty() {
            return Err(EaselError::NoMastersProduced {
                skipped: report.skipped.len(),
            });
        }

        let names: Vec<&str> = report.masters.iter().map(Master::display_name).collect();
        let app_properties = render::render_app_properties(&names).map_err(EaselError::Render)?;
        self.package
            .set_part_data(&PartName::new(part::APP_PROPERTIES)?, app_properties)?;

        let entries: Vec<MasterEntry> =
            report.masters.iter().filter_map(MasterEntry::new).collect();
        let index = render::render_masters_index(&entries).map_err(EaselError::Render)?;
        self.package.set_part_data(&self.masters_index, index)?;

        let linked = self.package.part(&self.document).is_some_and(|document| {
            document
                .relationships()
                .by_type(rel_type::MASTERS)
                .next()
                .is_some()
        });
        if !linked {
            let id = self.package.add_relationship(
                &self.document,
                &self.masters_index,
                rel_type::MASTERS,
                None,
                TargetMode::Internal,
            )?;
            debug!(id; "Linked masters index to document");
        }

        info!(
            masters = report.masters.len(),
            indexed = entries.len(),
            skipped = report.skipped.len();
            "Stencil finalized"
        );
        Ok(Assembler {
            package: self.package,
            document: self.document,
            masters_index: self.masters_index,
            state: Finalized { report },
        })
    }
}

impl Assembler<Finalized> {
    /// Serializes the package.
    pub fn seal(self) -> Result<(Vec<u8>, StencilReport), EaselError> {
        let bytes = self.package.seal()?;
        Ok((bytes, self.state.report))
    }
}

#[cfg(test)]
mod tests {
    use easel_core::{
        ordering::order_images,
        request::StencilRequest,
        scale::{Resolution, ResolutionUnit},
    };
    use image::{DynamicImage, RgbaImage};
    use proptest::prelude::*;

    use super::*;
    use crate::{raster::DecodedImage, thumbnail::Thumbnail};

    /// Decodes every path to a 20x10 image at 100 dpi, except names containing "bad".
    struct FakeDecoder;

    impl RasterDecoder for FakeDecoder {
        fn decode(&self, path: &Path) -> Result<DecodedImage, RasterError> {
            let name = path.to_string_lossy();
            let resolution = if name.contains("nodpi") {
                Resolution::unknown()
            } else {
                Resolution::new(ResolutionUnit::PixelsPerInch, 100.0, 100.0)
            };
            if name.contains("bad") {
                return Err(RasterError::Io(std::io::Error::other("unreadable")));
            }
            let image = DynamicImage::ImageRgba8(RgbaImage::new(20, 10));
            Ok(DecodedImage::new(image, resolution))
        }
    }

    /// Thumbnails everything except names containing "nothumb".
    struct FakeThumbnails;

    impl ThumbnailEncoder for FakeThumbnails {
        fn encode(&self, path: &Path) -> Thumbnail {
            if path.to_string_lossy().contains("nothumb") {
                Thumbnail::Unsupported
            } else {
                Thumbnail::Encoded("Qk0=".to_string())
            }
        }
    }

    fn run(paths: &[&str]) -> Result<(Vec<u8>, StencilReport), EaselError> {
        let request: StencilRequest = paths.iter().collect();
        let config = StencilConfig::default();
        let mut assembler = Assembler::open(&BaseTemplate::builtin())?.begin();
        for candidate in order_images(&request)? {
            assembler.add_image(&candidate, &config, &FakeDecoder, &FakeThumbnails)?;
        }
        assembler.finalize()?.seal()
    }

    fn name(s: &str) -> PartName {
        PartName::new(s).unwrap()
    }

    #[test]
    fn test_skipped_images_keep_their_ids() {
        let (bytes, report) = run(&["a.png", "b-nodpi.png", "c.png"]).unwrap();

        let ids: Vec<u32> = report.masters().iter().map(|m| m.id().get()).collect();
        assert_eq!(ids, vec![1, 3]);
        assert_eq!(report.skipped().len(), 1);
        assert_eq!(report.skipped()[0].id().get(), 2);
        assert!(matches!(
            report.skipped()[0].reason(),
            SkipReason::Scale(ScaleError::UnknownResolution)
        ));

        let package = Package::from_bytes(&bytes).unwrap();
        assert!(package.contains(&name("/visio/masters/master3.xml")));
        assert!(package.contains(&name("/visio/media/image3.png")));
        assert!(!package.contains(&name("/visio/masters/master2.xml")));
        assert!(!package.contains(&name("/visio/media/image2.png")));
    }

    #[test]
    fn test_decode_failure_is_a_skip() {
        let (_, report) = run(&["bad.png", "good.png"]).unwrap();
        assert_eq!(report.masters().len(), 1);
        assert!(matches!(report.skipped()[0].reason(), SkipReason::Raster(_)));
    }

    #[test]
    fn test_missing_thumbnail_keeps_master_and_relationships() {
        let (bytes, report) = run(&["a.png", "b-nothumb.png"]).unwrap();
        assert_eq!(
            report.missing_thumbnails().collect::<Vec<_>>(),
            vec![MasterId::new(2).unwrap()]
        );

        let package = Package::from_bytes(&bytes).unwrap();
        let index = package.part(&name(part::MASTERS)).unwrap();
        assert_eq!(index.relationships().len(), 2);
        assert!(index.relationships().get("rId2").is_some());

        let xml = String::from_utf8(index.data().to_vec()).unwrap();
        assert!(xml.contains(r#"ID="1""#));
        assert!(!xml.contains(r#"ID="2""#));

        let master = package.part(&name("/visio/masters/master2.xml")).unwrap();
        assert_eq!(master.relationships().len(), 1);
    }

    #[test]
    fn test_all_skipped_is_fatal() {
        let err = run(&["x-nodpi.png", "bad.png"]).unwrap_err();
        assert!(matches!(err, EaselError::NoMastersProduced { skipped: 2 }));
    }

    #[test]
    fn test_document_links_masters_index_once() {
        let (bytes, _) = run(&["a.png", "b.png"]).unwrap();
        let package = Package::from_bytes(&bytes).unwrap();

        let document = package.part(&name(part::DOCUMENT)).unwrap();
        let links: Vec<_> = document.relationships().by_type(rel_type::MASTERS).collect();
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].id(), "rId3");
        assert_eq!(links[0].target(), "masters/masters.xml");
    }

    #[test]
    fn test_app_properties_count_produced_masters() {
        let (bytes, _) = run(&["Beta.png", "alpha.png", "skip-nodpi.png"]).unwrap();
        let package = Package::from_bytes(&bytes).unwrap();

        let app = package.part(&name(part::APP_PROPERTIES)).unwrap();
        let xml = String::from_utf8(app.data().to_vec()).unwrap();
        assert!(xml.contains("<vt:i4>2</vt:i4>"));
        assert!(xml.find("alpha").unwrap() < xml.find("Beta").unwrap());
    }

    fn names_in_any_order() -> impl Strategy<Value = Vec<String>> {
        // Letters c..m never form the fake decoder's "bad"/"nodpi"/"nothumb" markers.
        prop::collection::btree_set("[c-m]{1,6}", 1..8)
            .prop_map(|names| {
                names
                    .into_iter()
                    .map(|name| format!("{name}.png"))
                    .collect::<Vec<_>>()
            })
            .prop_shuffle()
    }

    proptest! {
        #[test]
        fn master_parts_follow_sorted_names(names in names_in_any_order()) {
            let paths: Vec<&str> = names.iter().map(String::as_str).collect();
            let (bytes, report) = run(&paths).unwrap();
            let package = Package::from_bytes(&bytes).unwrap();

            let mut sorted = names.clone();
            sorted.sort();
            prop_assert_eq!(report.masters().len(), sorted.len());

            for (index, file_name) in sorted.iter().enumerate() {
                let part = package
                    .part(&name(&format!("/visio/masters/master{}.xml", index + 1)))
                    .unwrap();
                let xml = String::from_utf8(part.data().to_vec()).unwrap();
                let value = format!(r#"V="{file_name}""#);
                prop_assert!(xml.contains(&value), "master{} lacks {}", index + 1, file_name);
            }
        }
    }
}
