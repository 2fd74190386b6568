use std::fs;
use std::path::Path;

use drizzle_fits::{Hdu, HduList, Header, ImageData, MetadataTable};
use drizzle_wcs::Wcs;
use tracing::{debug, info, warn};

use super::headers::{
    clean_templates, fix_science_header, fix_weight_header, inherit_unique, populate_primary,
    scrub_product_header, synthesize_science_header, PrimaryFields, CHIP_SENTINEL,
};
use super::spec::{OutputMode, OutputSpecification};
use crate::chip::{ChipRecord, SharedParams};
use crate::errors::{ProductError, ProductResult};
use crate::provenance::{write_provenance, ProvenanceContext};
use crate::templates::{HeaderBundle, HeaderTemplateProvider};
use crate::wcs_sync::sync_wcs_keywords;

/// Default output units recorded in the provenance keywords.
pub const DEFAULT_UNITS: &str = "cps";

/// Arrays produced by the resampling engine, row-major.
#[derive(Debug, Clone, Copy)]
pub struct ProductArrays<'a> {
    pub science: &'a ImageData,
    pub weight: &'a ImageData,
    /// Context planes; a single plane is written as a 2-D image.
    pub context: Option<&'a ImageData>,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct EmitOptions {
    pub overwrite: bool,
    pub blend: bool,
    /// Component name and version pairs recorded as history.
    pub versions: Vec<(String, String)>,
}

impl Default for EmitOptions {
    fn default() -> Self {
        Self {
            overwrite: true,
            blend: true,
            versions: Vec::new(),
        }
    }
}

/// Builds the science, weight and context products of one drizzle run.
#[derive(Debug, Clone)]
pub struct OutputProductAssembler {
    chips: Vec<ChipRecord>,
    spec: OutputSpecification,
    wcs: Option<Wcs>,
    bunit: Option<String>,
    units: String,
}

/// Headers after template acquisition and cleanup.
struct ProductHeaders {
    primary: Header,
    science: Header,
    error: Header,
    dq: Header,
    table: Option<MetadataTable>,
}

impl OutputProductAssembler {
    /// Merges `shared` into every chip and resolves the output layout.
    pub fn new(
        mut chips: Vec<ChipRecord>,
        shared: &SharedParams,
        mode: OutputMode,
        wcs: Option<Wcs>,
    ) -> ProductResult<Self> {
        if chips.is_empty() {
            return Err(ProductError::NoChips);
        }
        for chip in &mut chips {
            shared.apply_to(&mut chip.drizzle);
        }
        let spec = OutputSpecification::resolve(&chips, mode)?;

        Ok(Self {
            chips,
            spec,
            wcs,
            bunit: None,
            units: DEFAULT_UNITS.to_string(),
        })
    }

    /// Explicit physical units for the science header.
    pub fn set_bunit(&mut self, bunit: impl Into<String>) {
        self.bunit = Some(bunit.into());
    }

    /// Output units recorded per chip in the provenance keywords.
    pub fn set_units(&mut self, units: impl Into<String>) {
        self.units = units.into();
    }

    pub fn chips(&self) -> &[ChipRecord] {
        &self.chips
    }

    pub fn specification(&self) -> &OutputSpecification {
        &self.spec
    }

    fn mode(&self) -> OutputMode {
        self.spec.mode()
    }

    fn images_combined(&self) -> usize {
        match self.chips[0].combine_count {
            0 => self.chips.len(),
            n => n,
        }
    }

    /// Writes every product file of the active mode.
    ///
    /// Existing targets fail the call unless `options.overwrite` is set, in
    /// which case they are deleted before anything is written. The sequence
    /// is not atomic: a failure after deletion leaves the product missing.
    pub fn emit(
        &self,
        provider: &dyn HeaderTemplateProvider,
        sources: &[String],
        arrays: ProductArrays<'_>,
        options: &EmitOptions,
    ) -> ProductResult<()> {
        let targets = self.spec.targets();
        for target in &targets {
            if target.exists() && !options.overwrite {
                warn!(
                    path = %target.display(),
                    "output product already exists and overwrite is disabled"
                );
                return Err(ProductError::product_exists(*target));
            }
        }
        self.validate_shapes(&arrays)?;
        for target in &targets {
            if target.exists() {
                info!(path = %target.display(), "deleting previous output product");
                fs::remove_file(target)?;
            }
        }

        let mode = self.mode();
        let blend = options.blend && !mode.single_exposure;
        let bundle = provider.get_templates(sources, blend)?;
        debug!(
            sources = sources.len(),
            blend,
            has_science = bundle.science.is_some(),
            has_table = bundle.table.is_some(),
            "acquired header templates"
        );
        let mut headers = self.prepare_headers(bundle, options);

        if mode.combined_file {
            self.write_combined(&mut headers, &arrays)
        } else {
            self.write_split(&mut headers, &arrays)
        }
    }

    fn validate_shapes(&self, arrays: &ProductArrays<'_>) -> ProductResult<()> {
        let expected = self.spec.shape().dims();
        for (name, data) in [("science", arrays.science), ("weight", arrays.weight)] {
            if data.shape() != expected {
                return Err(ProductError::shape_mismatch(name, &expected, data.shape()));
            }
        }
        if let Some(context) = arrays.context {
            let shape = context.shape();
            let planes_ok = match shape.len() {
                2 => true,
                3 => shape[0] >= 1,
                _ => false,
            };
            if !planes_ok || shape[shape.len().saturating_sub(2)..] != expected {
                return Err(ProductError::shape_mismatch("context", &expected, shape));
            }
        }
        Ok(())
    }

    fn prepare_headers(&self, bundle: HeaderBundle, options: &EmitOptions) -> ProductHeaders {
        let mode = self.mode();
        let mut primary = bundle.primary;
        let mut science = match bundle.science {
            Some(header) => header,
            None => synthesize_science_header(&mut primary),
        };
        let mut error = bundle.error.unwrap_or_default();
        let mut dq = bundle.dq.unwrap_or_default();
        clean_templates(&mut science, &mut error, &mut dq);

        let table_slot = usize::from(bundle.table.is_some());
        let nextend = if mode.combined_file {
            3 + table_slot
        } else {
            table_slot
        };
        let output_name = file_name(self.spec.output());
        populate_primary(
            &mut primary,
            &PrimaryFields {
                extend: mode.combined_file,
                nextend,
                file_name: &output_name,
                window: self.spec.window(),
                images_combined: self.chips.len(),
            },
        );

        if !mode.back_projection {
            let context = ProvenanceContext {
                single: mode.single_exposure,
                units: self.units.clone(),
                out_data: self.spec.data().display().to_string(),
                out_weight: display_or_empty(self.spec.weight()),
                out_context: display_or_empty(self.spec.context()),
            };
            write_provenance(&mut primary, &self.chips, &context, &options.versions);
        }

        fix_science_header(&mut science, self.bunit.as_deref(), self.images_combined());
        if let Some(wcs) = &self.wcs {
            sync_wcs_keywords(wcs, &mut science, mode.back_projection);
        }

        ProductHeaders {
            primary,
            science,
            error,
            dq,
            table: bundle.table,
        }
    }

    fn sync(&self, header: &mut Header) {
        if let Some(wcs) = &self.wcs {
            sync_wcs_keywords(wcs, header, self.mode().back_projection);
        }
    }

    fn write_combined(
        &self,
        headers: &mut ProductHeaders,
        arrays: &ProductArrays<'_>,
    ) -> ProductResult<()> {
        let output = self.spec.output();
        info!(path = %output.display(), "generating multi-extension output file");

        fix_weight_header(&mut headers.error);
        self.sync(&mut headers.error);
        self.sync(&mut headers.dq);
        for header in [
            &mut headers.primary,
            &mut headers.science,
            &mut headers.error,
            &mut headers.dq,
        ] {
            scrub_product_header(header);
        }

        let mut hdus = HduList::new();
        hdus.push(Hdu::header_only(headers.primary.clone()));
        hdus.push(Hdu::named_image(
            headers.science.clone(),
            arrays.science.clone(),
            "SCI",
            1,
        ));
        hdus.push(Hdu::named_image(
            headers.error.clone(),
            arrays.weight.clone(),
            "WHT",
            1,
        ));
        hdus.push(match arrays.context {
            Some(context) => {
                Hdu::named_image(headers.dq.clone(), context.clone().squeeze(), "CTX", 1)
            }
            None => Hdu::named_empty(headers.dq.clone(), "CTX", 1),
        });
        if let Some(table) = &headers.table {
            hdus.push(Hdu::table(Header::new(), table.clone()));
        }
        hdus.write_to(output)?;
        Ok(())
    }

    fn write_split(
        &self,
        headers: &mut ProductHeaders,
        arrays: &ProductArrays<'_>,
    ) -> ProductResult<()> {
        let data_path = self.spec.data();
        info!(path = %data_path.display(), "generating simple FITS output");
        let mut hdus = HduList::new();
        hdus.push(Hdu::image(
            self.split_header(headers, &headers.science, data_path),
            arrays.science.clone(),
        ));
        if let Some(table) = &headers.table {
            hdus.push(Hdu::table(Header::new(), table.clone()));
        }
        hdus.write_to(data_path)?;

        if let Some(weight_path) = self.spec.weight() {
            fix_weight_header(&mut headers.error);
            let mut header = self.split_header(headers, &headers.error, weight_path);
            header.set("CCDCHIP", CHIP_SENTINEL);
            info!(path = %weight_path.display(), "generating weight output file");
            write_single_hdu(weight_path, header, arrays.weight.clone())?;
        }

        if let (Some(context_path), Some(context)) = (self.spec.context(), arrays.context) {
            let header = self.split_header(headers, &headers.dq, context_path);
            info!(path = %context_path.display(), "generating context output file");
            write_single_hdu(context_path, header, context.clone().squeeze())?;
        }
        Ok(())
    }

    /// Primary header of one split file: the product primary plus the unique
    /// cards of its template.
    fn split_header(&self, headers: &ProductHeaders, template: &Header, path: &Path) -> Header {
        let mut header = headers.primary.clone();
        inherit_unique(&mut header, template);
        header.set("FILENAME", file_name(path).as_str());
        self.sync(&mut header);
        scrub_product_header(&mut header);
        header
    }
}

fn write_single_hdu(path: &Path, header: Header, data: ImageData) -> ProductResult<()> {
    let mut hdus = HduList::new();
    hdus.push(Hdu::image(header, data));
    hdus.write_to(path)?;
    Ok(())
}

pub(crate) fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn display_or_empty(path: Option<&Path>) -> String {
    path.map(|p| p.display().to_string()).unwrap_or_default()
}
