//! Orchestration of the recovery stages.

use std::collections::{HashMap, HashSet};
use std::time::Instant;

use hexid_core::{color_mask, locate_region, RasterImage};
use hexid_decode::{is_hex_id, AmbiguityExpander, CandidateExtractor, RankedCandidate, Ranker};
use hexid_preprocess::{decode_raster, render_crop, PreprocessedVariant, VariantGenerator};

use crate::adapter::{Recognizer, Validator};
use crate::result::{Dispatch, RecoveryReport, Stage, VariantReport};
use crate::{CooldownState, FailureReason, PipelineResult, RecoveryParams};

/// Recovers one identifier per input image.
///
/// Holds the injected recognizer and optional validator together with the
/// stage configuration; cooldown bookkeeping is passed in per call so a
/// single recoverer can serve many sources.
pub struct IdRecoverer {
    params: RecoveryParams,
    recognizer: Box<dyn Recognizer>,
    validator: Option<Box<dyn Validator>>,
    variants: VariantGenerator,
    extractor: CandidateExtractor,
    expander: AmbiguityExpander,
    ranker: Ranker,
}

impl IdRecoverer {
    pub fn new(params: RecoveryParams, recognizer: impl Recognizer + 'static) -> Self {
        Self {
            variants: VariantGenerator::new(params.variants.clone()),
            extractor: CandidateExtractor::new(params.extract),
            expander: AmbiguityExpander::new(params.expand),
            ranker: Ranker::new(params.rank),
            recognizer: Box::new(recognizer),
            validator: None,
            params,
        }
    }

    pub fn with_validator(mut self, validator: impl Validator + 'static) -> Self {
        self.validator = Some(Box::new(validator));
        self
    }

    #[inline]
    pub fn params(&self) -> &RecoveryParams {
        &self.params
    }

    /// Whether candidates go through the validator.
    pub fn validation_enabled(&self) -> bool {
        self.params.validate && self.validator.is_some()
    }

    /// A cooldown map sized to the configured window.
    pub fn cooldown_state(&self) -> CooldownState {
        CooldownState::new(self.params.cooldown())
    }

    /// Run the pipeline unless `source` is still cooling down.
    pub fn recover(&self, input: &[u8], source: &str, cooldown: &CooldownState) -> Dispatch {
        self.recover_at(input, source, cooldown, Instant::now())
    }

    /// [`Self::recover`] with an explicit clock reading.
    ///
    /// `source` is claimed at `now` before any work starts, so a concurrent
    /// invocation of the same source is skipped while this one runs. A
    /// skipped invocation leaves `cooldown` untouched; every invocation that
    /// runs records `now`, whatever its result.
    pub fn recover_at(
        &self,
        input: &[u8],
        source: &str,
        cooldown: &CooldownState,
        now: Instant,
    ) -> Dispatch {
        if let Err(remaining) = cooldown.try_claim(source, now) {
            log::debug!("source {source} cooling down for {remaining:?}");
            return Dispatch::CoolingDown { remaining };
        }
        Dispatch::Ran(Box::new(self.run(input)))
    }

    /// Decode `input` and run every stage.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(level = "info", skip_all, fields(bytes = input.len()))
    )]
    pub fn run(&self, input: &[u8]) -> RecoveryReport {
        match decode_raster(input, self.params.max_width) {
            Ok(raster) => self.run_raster(&raster),
            Err(err) => RecoveryReport::new().fail(FailureReason::InvalidImage(err.to_string())),
        }
    }

    /// Run every stage on an already decoded raster.
    pub fn run_raster(&self, raster: &RasterImage) -> RecoveryReport {
        let mut report = RecoveryReport::new();
        report.image_size = Some([raster.width(), raster.height()]);

        let variants = match self.prepare(raster, &mut report) {
            Ok(variants) => variants,
            Err(reason) => return report.fail(reason),
        };

        self.recognize_all(&variants, &mut report);
        let texts: Vec<String> = report.texts().map(str::to_owned).collect();
        if texts.is_empty() {
            return report.fail(FailureReason::NoTextRecognized);
        }
        report.stage = Stage::Recognized;

        let table = self.extractor.extract_all(texts.iter().map(String::as_str));
        let ranked = self.ranker.rank(&table);
        report.candidates = ranked;
        report.stage = Stage::CandidatesRanked;

        let id_len = self.params.extract.id_len;
        let eligible: Vec<&RankedCandidate> = report
            .candidates
            .iter()
            .filter(|c| c.is_id_shaped(id_len, self.params.min_hex_purity))
            .collect();
        let top = eligible.first().map(|c| c.value.clone());

        if let Some(validator) = self.validator.as_deref().filter(|_| self.params.validate) {
            let order: Vec<&str> = eligible.iter().map(|c| c.value.as_str()).collect();
            let (confirmed, calls) = self.confirm(validator, &order);
            report.validator_calls = calls;
            report.stage = Stage::Validated;
            if let Some(id) = confirmed {
                log::info!("recovered {id} after {calls} validator call(s)");
                report.result = PipelineResult::Recovered(id);
                return report;
            }
            return match top {
                None => report.fail(FailureReason::NoCandidateFormed),
                Some(id) if self.params.best_effort => {
                    log::info!("no candidate confirmed; best effort {id}");
                    report.result = PipelineResult::UnverifiedBestEffort(id);
                    report
                }
                Some(_) => report.fail(FailureReason::ValidationExhausted { calls }),
            };
        }

        match top {
            Some(id) => {
                log::info!("accepting {id} without validation");
                report.result = PipelineResult::UnverifiedBestEffort(id);
                report
            }
            None => report.fail(FailureReason::NoCandidateFormed),
        }
    }

    /// Build the variant list for `input` without recognizing anything.
    pub fn render_variants(&self, input: &[u8]) -> Result<Vec<PreprocessedVariant>, FailureReason> {
        let raster = decode_raster(input, self.params.max_width)
            .map_err(|err| FailureReason::InvalidImage(err.to_string()))?;
        self.prepare(&raster, &mut RecoveryReport::new())
    }

    /// Mask, locate and render variants, advancing `report.stage`.
    fn prepare(
        &self,
        raster: &RasterImage,
        report: &mut RecoveryReport,
    ) -> Result<Vec<PreprocessedVariant>, FailureReason> {
        let mask = color_mask(raster, &self.params.color);
        report.mask_pixels = mask.count_positive();
        report.stage = Stage::MaskBuilt;

        let region = locate_region(&mask, &self.params.region)
            .map_err(|_| FailureReason::NoRegionFound)?;
        log::debug!(
            "region {}x{} at ({}, {})",
            region.width(),
            region.height(),
            region.min_x,
            region.min_y
        );
        report.region = Some(region);
        report.stage = Stage::RegionFound;

        let crop = render_crop(&mask, &region).map_err(|err| {
            log::warn!("crop rendering failed: {err}");
            FailureReason::NoRegionFound
        })?;
        let variants = self
            .variants
            .generate(&crop)
            .map_err(|err| FailureReason::InvalidImage(err.to_string()))?;
        report.stage = Stage::VariantsBuilt;
        Ok(variants)
    }

    /// Recognize every variant; identical renderings are read once.
    fn recognize_all(&self, variants: &[PreprocessedVariant], report: &mut RecoveryReport) {
        let mut seen: HashMap<&[u8], usize> = HashMap::new();
        for variant in variants {
            let (text, error) = match seen.get(variant.png.as_slice()) {
                Some(&i) => (report.variants[i].text.clone(), report.variants[i].error.clone()),
                None => {
                    seen.insert(variant.png.as_slice(), report.variants.len());
                    report.recognizer_calls += 1;
                    match self.recognizer.recognize(&variant.png) {
                        Ok(text) => (Some(text), None),
                        Err(err) => {
                            log::warn!("recognition of {} failed: {err}", variant.strategy);
                            (None, Some(err.to_string()))
                        }
                    }
                }
            };
            log::debug!("{} -> {:?}", variant.strategy, text.as_deref().unwrap_or(""));
            report.variants.push(VariantReport {
                strategy: variant.strategy,
                width: variant.width,
                height: variant.height,
                text,
                error,
            });
        }
    }

    /// Offer each candidate and then its expansions to `validator`, stopping
    /// at the first confirmation or when the call budget runs out.
    fn confirm(&self, validator: &dyn Validator, order: &[&str]) -> (Option<String>, usize) {
        let id_len = self.params.extract.id_len;
        let budget = self.params.max_validation_calls;
        let mut tried: HashSet<String> = HashSet::new();
        let mut calls = 0usize;
        for candidate in order {
            for variant in self.expander.expand(candidate) {
                if !is_hex_id(&variant, id_len) || tried.contains(&variant) {
                    continue;
                }
                if calls >= budget {
                    log::debug!("validator budget of {budget} call(s) exhausted");
                    return (None, calls);
                }
                calls += 1;
                match validator.validate(&variant) {
                    Ok(true) => return (Some(variant), calls),
                    Ok(false) => {}
                    Err(err) => log::warn!("validation of {variant} failed: {err}"),
                }
                tried.insert(variant);
            }
        }
        (None, calls)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::{RecognitionError, ValidatorError};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Dark raster with a green band of "glyphs".
    fn green_text_raster(w: usize, h: usize) -> RasterImage {
        let mut data = vec![20u8; w * h * 3];
        for y in h / 3..h / 2 {
            for x in w / 4..3 * w / 4 {
                if (x / 4) % 3 != 2 {
                    let i = (y * w + x) * 3;
                    data[i] = 30;
                    data[i + 1] = 210;
                    data[i + 2] = 40;
                }
            }
        }
        RasterImage::new(w, h, 3, data).unwrap()
    }

    fn scripted(text: &'static str) -> impl Recognizer {
        move |_: &[u8]| Ok::<_, RecognitionError>(text.to_string())
    }

    #[test]
    fn identical_renderings_are_recognized_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let recognizer = move |_: &[u8]| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok::<_, RecognitionError>("3F2A9B00C1D4E5F6".to_string())
        };
        let params = RecoveryParams {
            validate: false,
            ..RecoveryParams::default()
        };
        let report = IdRecoverer::new(params, recognizer).run_raster(&green_text_raster(200, 90));
        assert_eq!(report.variants.len(), 9);
        assert_eq!(report.recognizer_calls, calls.load(Ordering::SeqCst));
        assert!(report.recognizer_calls < report.variants.len());
        assert_eq!(
            report.result,
            PipelineResult::UnverifiedBestEffort("3F2A9B00C1D4E5F6".into())
        );
    }

    #[test]
    fn recognition_errors_are_absorbed() {
        let recognizer = |png: &[u8]| {
            if png.len() % 2 == 0 {
                Err(RecognitionError::Failed("flaky".into()))
            } else {
                Ok("3F2A9B00C1D4E5F6".to_string())
            }
        };
        let params = RecoveryParams {
            validate: false,
            ..RecoveryParams::default()
        };
        let report = IdRecoverer::new(params, recognizer).run_raster(&green_text_raster(200, 90));
        let errors = report.variants.iter().filter(|v| v.error.is_some()).count();
        let texts = report.texts().count();
        assert_eq!(errors + texts, report.variants.len());
        if texts > 0 {
            assert_eq!(report.result.id(), Some("3F2A9B00C1D4E5F6"));
        } else {
            assert_eq!(
                report.result,
                PipelineResult::Failed(FailureReason::NoTextRecognized)
            );
        }
    }

    #[test]
    fn validation_budget_limits_calls() {
        let params = RecoveryParams {
            max_validation_calls: 3,
            best_effort: false,
            ..RecoveryParams::default()
        };
        let recoverer = IdRecoverer::new(params, scripted("0000000000000000"))
            .with_validator(|_: &str| Ok::<_, ValidatorError>(false));
        let report = recoverer.run_raster(&green_text_raster(200, 90));
        assert_eq!(report.validator_calls, 3);
        assert_eq!(
            report.result,
            PipelineResult::Failed(FailureReason::ValidationExhausted { calls: 3 })
        );
    }

    #[test]
    fn validator_errors_count_but_do_not_stop() {
        let recoverer = IdRecoverer::new(RecoveryParams::default(), scripted("3F2A9800C1D4E5F6"))
            .with_validator(|c: &str| {
                if c == "3F2A9800C1D4E5F6" {
                    Err(ValidatorError::Lookup("timeout".into()))
                } else {
                    Ok(c == "3F2A9B00C1D4E5F6")
                }
            });
        let report = recoverer.run_raster(&green_text_raster(200, 90));
        assert_eq!(
            report.result,
            PipelineResult::Recovered("3F2A9B00C1D4E5F6".into())
        );
        assert_eq!(report.validator_calls, 2);
        assert_eq!(report.stage, Stage::Validated);
    }

    #[test]
    fn disabled_validation_ignores_attached_validator() {
        let params = RecoveryParams {
            validate: false,
            ..RecoveryParams::default()
        };
        let recoverer = IdRecoverer::new(params, scripted("3F2A9B00C1D4E5F6"))
            .with_validator(|_: &str| Ok::<_, ValidatorError>(true));
        assert!(!recoverer.validation_enabled());
        let report = recoverer.run_raster(&green_text_raster(200, 90));
        assert_eq!(report.validator_calls, 0);
        assert_eq!(
            report.result,
            PipelineResult::UnverifiedBestEffort("3F2A9B00C1D4E5F6".into())
        );
    }
}
