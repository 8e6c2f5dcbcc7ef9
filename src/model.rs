use crate::engine::{Engine, ModelDescriptor, Tensor};
use crate::error::{PipelineError, Result};
use crate::features::{FEATURE_COUNT, FEATURE_ORDER};
use crate::types::FeatureVector;

/// Owns the loaded engine and turns a [`FeatureVector`] into the model's raw
/// minutes-until-charge estimate.
pub struct ModelInvoker {
    engine: Box<dyn Engine>,
    input_name: String,
    output_name: String,
}

impl std::fmt::Debug for ModelInvoker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelInvoker")
            .field("input_name", &self.input_name)
            .field("output_name", &self.output_name)
            .finish_non_exhaustive()
    }
}

impl ModelInvoker {
    /// Validate the engine's declared signature and take ownership of it.
    pub fn new(engine: impl Engine + 'static) -> Result<Self> {
        let (input_name, output_name) = check_descriptor(engine.descriptor())?;
        tracing::info!(input = %input_name, output = %output_name, "model signature ok");
        Ok(Self {
            engine: Box::new(engine),
            input_name,
            output_name,
        })
    }

    pub fn descriptor(&self) -> &ModelDescriptor {
        self.engine.descriptor()
    }

    /// One forward pass over a `[1, 5]` input. No retries.
    pub fn predict(&self, features: &FeatureVector) -> Result<f32> {
        let input = Tensor::new(vec![1, FEATURE_COUNT], features.as_slice().to_vec());

        let outputs = self
            .engine
            .run(&self.input_name, &input, &self.output_name)
            .map_err(PipelineError::Inference)?;

        // Engines that can't name outputs hand back unnamed tensors; take the first.
        // A tensor named anything else is never read as the prediction.
        let out = outputs
            .iter()
            .find(|t| t.name.as_deref() == Some(self.output_name.as_str()))
            .or_else(|| outputs.first().filter(|t| t.name.is_none()))
            .ok_or(PipelineError::EmptyOutput)?;

        out.first().ok_or(PipelineError::EmptyOutput)
    }
}

fn check_descriptor(d: &ModelDescriptor) -> Result<(String, String)> {
    if d.inputs.len() != 1 || d.outputs.len() != 1 {
        return Err(PipelineError::UnexpectedModelShape(format!(
            "expected 1 input and 1 output, found {} inputs and {} outputs",
            d.inputs.len(),
            d.outputs.len()
        )));
    }
    if let Some(in_dim) = d.in_dim {
        if in_dim != FEATURE_COUNT {
            return Err(PipelineError::UnexpectedModelShape(format!(
                "model expects {in_dim} features, pipeline produces {FEATURE_COUNT}"
            )));
        }
    }
    if let Some(feat_list) = &d.feat_list {
        if feat_list.iter().map(String::as_str).ne(FEATURE_ORDER) {
            return Err(PipelineError::UnexpectedModelShape(format!(
                "model feature order {feat_list:?} does not match {FEATURE_ORDER:?}"
            )));
        }
    }
    Ok((d.inputs[0].clone(), d.outputs[0].clone()))
}
