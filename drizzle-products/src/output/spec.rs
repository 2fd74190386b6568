use std::path::{Path, PathBuf};

use crate::chip::{ChipRecord, ImageShape};
use crate::errors::{ProductError, ProductResult};

/// The three independent switches selecting a product layout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct OutputMode {
    /// One multi-extension file instead of separate science/weight/context files.
    pub combined_file: bool,
    /// One product per input exposure instead of one mosaic.
    pub single_exposure: bool,
    /// Back-projection ("blot") of a model image onto an input frame.
    pub back_projection: bool,
}

impl OutputMode {
    pub fn new(combined_file: bool, single_exposure: bool, back_projection: bool) -> Self {
        Self {
            combined_file,
            single_exposure,
            back_projection,
        }
    }
}

/// Exposure-time window stamped into the primary header.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExposureWindow {
    pub texptime: f64,
    pub expstart: f64,
    pub expend: f64,
}

/// Output names, shape and time window resolved from the chip list.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputSpecification {
    mode: OutputMode,
    output: PathBuf,
    data: PathBuf,
    weight: Option<PathBuf>,
    context: Option<PathBuf>,
    shape: ImageShape,
    window: Option<ExposureWindow>,
}

impl OutputSpecification {
    /// Applies the mode-selection rules to `chips`.
    ///
    /// Back-projection decides the output path and shape on its own. The
    /// exposure window always comes from the first chip, except `expend`
    /// which comes from the last chip for combined (non single-exposure)
    /// products. Blot products and zero exposure times carry no window.
    pub fn resolve(chips: &[ChipRecord], mode: OutputMode) -> ProductResult<Self> {
        let first = chips.first().ok_or(ProductError::NoChips)?;
        let last = chips.last().ok_or(ProductError::NoChips)?;

        let (data, weight, context, shape) = if mode.back_projection {
            let blot = required(&first.blot_image, "blot_image")?;
            let shape = first
                .blot_shape
                .ok_or_else(|| ProductError::missing_field(0, "blot_shape"))?;
            (blot, None, None, shape)
        } else if mode.single_exposure {
            (
                required(&first.out_single, "out_single")?,
                first.out_single_weight.clone(),
                first.out_single_context.clone(),
                first.output_shape,
            )
        } else if mode.combined_file {
            (
                required(&first.out_final, "out_final")?,
                first.out_weight.clone(),
                first.out_context.clone(),
                first.output_shape,
            )
        } else {
            (
                required(&first.out_sci, "out_sci")?,
                first.out_weight.clone(),
                first.out_context.clone(),
                first.output_shape,
            )
        };

        let expend = if mode.single_exposure {
            first.expend
        } else {
            last.expend
        };
        let window = (!mode.back_projection && first.exptime > 0.0).then_some(ExposureWindow {
            texptime: first.exptime,
            expstart: first.expstart,
            expend,
        });

        Ok(Self {
            mode,
            output: data.clone(),
            data,
            weight,
            context,
            shape,
            window,
        })
    }

    pub fn mode(&self) -> OutputMode {
        self.mode
    }

    /// Path of the multi-extension file, or of the science file when split.
    pub fn output(&self) -> &Path {
        &self.output
    }

    pub fn data(&self) -> &Path {
        &self.data
    }

    pub fn weight(&self) -> Option<&Path> {
        self.weight.as_deref()
    }

    pub fn context(&self) -> Option<&Path> {
        self.context.as_deref()
    }

    pub fn shape(&self) -> ImageShape {
        self.shape
    }

    pub fn window(&self) -> Option<ExposureWindow> {
        self.window
    }

    /// Every file this mode will write, in emission order.
    pub fn targets(&self) -> Vec<&Path> {
        if self.mode.combined_file {
            return vec![self.output.as_path()];
        }
        let mut targets = vec![self.data.as_path()];
        targets.extend(self.weight());
        targets.extend(self.context());
        targets
    }
}

fn required(path: &Option<PathBuf>, field: &'static str) -> ProductResult<PathBuf> {
    path.clone().ok_or_else(|| ProductError::missing_field(0, field))
}
