use anyhow::{bail, Result};
use tch::{kind::Kind, CModule, Device};

use crate::engine::{Engine, ModelArtifact, ModelDescriptor, Tensor};
use crate::error::PipelineError;

/// TorchScript-backed engine. TorchScript modules have positional inputs and
/// outputs, so names come from the sidecar descriptor only.
pub struct TorchEngine {
    model: CModule,
    device: Device,
    descriptor: ModelDescriptor,
}

impl TorchEngine {
    pub fn load(artifact: ModelArtifact, intra_op_threads: i32) -> Result<Self, PipelineError> {
        let device = Device::Cpu;
        tch::set_num_threads(intra_op_threads);

        let model = CModule::load_on_device(&artifact.model_path, device).map_err(|e| {
            PipelineError::ModelLoad {
                path: artifact.model_path.clone(),
                detail: anyhow::Error::new(e).context("failed to load TorchScript"),
            }
        })?;
        tracing::info!(path = %artifact.model_path.display(), "loaded TorchScript model");

        Ok(Self {
            model,
            device,
            descriptor: artifact.descriptor,
        })
    }
}

impl Engine for TorchEngine {
    fn descriptor(&self) -> &ModelDescriptor {
        &self.descriptor
    }

    fn run(&self, _input_name: &str, input: &Tensor, output_name: &str) -> Result<Vec<Tensor>> {
        let x = to_torch(input, self.device);
        let y = self.model.forward_ts(&[x])?;
        Ok(vec![from_torch(&y)?.named(output_name)])
    }
}

fn to_torch(t: &Tensor, device: Device) -> tch::Tensor {
    let shape: Vec<i64> = t.shape.iter().map(|&d| d as i64).collect();
    tch::Tensor::from_slice(&t.data)
        .reshape(shape.as_slice())
        .to_device(device)
}

fn from_torch(y: &tch::Tensor) -> Result<Tensor> {
    let sz = y.size();
    if sz.iter().any(|&d| d < 0) {
        bail!("unexpected model output size: {:?}", sz);
    }
    let data = Vec::<f32>::try_from(&y.to_kind(Kind::Float).flatten(0, -1))?;
    let shape = sz.into_iter().map(|d| d as usize).collect();
    Ok(Tensor::new(shape, data))
}
