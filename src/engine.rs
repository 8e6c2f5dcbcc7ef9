//! The model-evaluation capability the pipeline runs against.
//!
//! An [`Engine`] is a loaded model plus the [`ModelDescriptor`] describing its
//! signature. The real implementation wraps a TorchScript module (see
//! `torch.rs`); [`StubEngine`] stands in for it wherever a model artifact is
//! not available.

use std::{
    fs,
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::Context;
use parking_lot::Mutex;
use serde::Deserialize;

use crate::error::{PipelineError, Result};

/// A dense f32 tensor, row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct Tensor {
    pub name: Option<String>,
    pub shape: Vec<usize>,
    pub data: Vec<f32>,
}

impl Tensor {
    pub fn new(shape: Vec<usize>, data: Vec<f32>) -> Self {
        debug_assert_eq!(shape.iter().product::<usize>(), data.len());
        Self {
            name: None,
            shape,
            data,
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Single-element tensor of shape [1, 1].
    pub fn scalar(value: f32) -> Self {
        Self::new(vec![1, 1], vec![value])
    }

    pub fn first(&self) -> Option<f32> {
        self.data.first().copied()
    }
}

/// Signature metadata of a loaded model.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ModelDescriptor {
    pub inputs: Vec<String>,
    pub outputs: Vec<String>,
    /// Feature names the model was trained on, in input order.
    #[serde(default)]
    pub feat_list: Option<Vec<String>>,
    #[serde(default)]
    pub in_dim: Option<usize>,
}

impl ModelDescriptor {
    /// Descriptor for a plain one-input, one-output model.
    pub fn single(input: impl Into<String>, output: impl Into<String>) -> Self {
        Self {
            inputs: vec![input.into()],
            outputs: vec![output.into()],
            feat_list: None,
            in_dim: None,
        }
    }

    /// Read the JSON sidecar that ships next to a model artifact.
    pub fn load(meta_path: &Path) -> Result<Self> {
        if !meta_path.exists() {
            return Err(PipelineError::ModelNotFound {
                path: meta_path.to_path_buf(),
            });
        }
        let parsed = fs::read_to_string(meta_path)
            .with_context(|| format!("failed to read meta at {}", meta_path.display()))
            .and_then(|txt| {
                serde_json::from_str::<ModelDescriptor>(&txt)
                    .context("failed to parse model metadata")
            });
        parsed.map_err(|detail| PipelineError::ModelLoad {
            path: meta_path.to_path_buf(),
            detail,
        })
    }
}

/// Where a model and its metadata live on disk.
#[derive(Debug, Clone)]
pub struct ModelArtifact {
    pub model_path: PathBuf,
    pub descriptor: ModelDescriptor,
}

impl ModelArtifact {
    /// Check that the model file exists and read its descriptor. Does not
    /// touch the model file's contents; that is up to the engine.
    pub fn locate(model_path: &Path, meta_path: &Path) -> Result<Self> {
        if !model_path.exists() {
            return Err(PipelineError::ModelNotFound {
                path: model_path.to_path_buf(),
            });
        }
        let descriptor = ModelDescriptor::load(meta_path)?;
        Ok(Self {
            model_path: model_path.to_path_buf(),
            descriptor,
        })
    }
}

pub trait Engine: Send + Sync {
    fn descriptor(&self) -> &ModelDescriptor;

    /// Evaluate the model once with `input` bound to `input_name`, asking for
    /// `output_name`. May return zero or more tensors.
    fn run(&self, input_name: &str, input: &Tensor, output_name: &str)
        -> anyhow::Result<Vec<Tensor>>;
}

impl<E: Engine + ?Sized> Engine for Arc<E> {
    fn descriptor(&self) -> &ModelDescriptor {
        (**self).descriptor()
    }

    fn run(
        &self,
        input_name: &str,
        input: &Tensor,
        output_name: &str,
    ) -> anyhow::Result<Vec<Tensor>> {
        (**self).run(input_name, input, output_name)
    }
}

impl<E: Engine + ?Sized> Engine for Box<E> {
    fn descriptor(&self) -> &ModelDescriptor {
        (**self).descriptor()
    }

    fn run(
        &self,
        input_name: &str,
        input: &Tensor,
        output_name: &str,
    ) -> anyhow::Result<Vec<Tensor>> {
        (**self).run(input_name, input, output_name)
    }
}

#[derive(Debug, Clone)]
enum Reply {
    Tensors(Vec<Tensor>),
    Fail(String),
}

/// Recorded call to a [`StubEngine`].
#[derive(Debug, Clone, PartialEq)]
pub struct StubCall {
    pub input_name: String,
    pub input: Tensor,
    pub output_name: String,
}

/// In-memory engine with a canned reply. Records every invocation.
#[derive(Debug)]
pub struct StubEngine {
    descriptor: ModelDescriptor,
    reply: Reply,
    calls: Mutex<Vec<StubCall>>,
}

impl StubEngine {
    /// Always answers with a single `[1, 1]` tensor holding `minutes`.
    pub fn constant(minutes: f32) -> Self {
        Self::replying(vec![Tensor::scalar(minutes).named("variable")])
    }

    pub fn replying(tensors: Vec<Tensor>) -> Self {
        Self {
            descriptor: ModelDescriptor::single("float_input", "variable"),
            reply: Reply::Tensors(tensors),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Every invocation fails with `message`.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            reply: Reply::Fail(message.into()),
            ..Self::replying(Vec::new())
        }
    }

    pub fn with_descriptor(mut self, descriptor: ModelDescriptor) -> Self {
        self.descriptor = descriptor;
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    pub fn calls(&self) -> Vec<StubCall> {
        self.calls.lock().clone()
    }
}

impl Engine for StubEngine {
    fn descriptor(&self) -> &ModelDescriptor {
        &self.descriptor
    }

    fn run(
        &self,
        input_name: &str,
        input: &Tensor,
        output_name: &str,
    ) -> anyhow::Result<Vec<Tensor>> {
        self.calls.lock().push(StubCall {
            input_name: input_name.to_string(),
            input: input.clone(),
            output_name: output_name.to_string(),
        });
        match &self.reply {
            Reply::Tensors(t) => Ok(t.clone()),
            Reply::Fail(msg) => anyhow::bail!("{msg}"),
        }
    }
}
