//! File/code adapted from https://github.com/jamjamjon/usls

use anyhow::Result;
use half::f16;
use ndarray::{Array, IxDyn};
use ort::{
    execution_providers::{ExecutionProvider,
                          CPUExecutionProvider,
                          CUDAExecutionProvider,
                          TensorRTExecutionProvider,
                          CoreMLExecutionProvider},
    session::builder::{GraphOptimizationLevel, SessionBuilder},
    session::{Session, SessionInputValue},
    tensor::TensorElementType,
    value::{DynValue, Tensor, ValueType},
};
use crate::common::InferenceDevice;
use crate::data::{ConfigOrt, Xs, X, CROSS_MARK};

/// Names, element types and dimensions of a model's inputs or outputs.
/// Dynamic dimensions are stored as `0`.
#[derive(Debug, Clone, Default)]
pub struct OrtTensorAttr {
    pub names: Vec<String>,
    pub dtypes: Vec<TensorElementType>,
    pub dimss: Vec<Vec<usize>>,
}

impl OrtTensorAttr {
    fn push(&mut self, name: &str, value_type: &ValueType) -> Result<()> {
        match value_type {
            ValueType::Tensor { ty, dimensions, .. } => {
                self.names.push(name.to_string());
                self.dtypes.push(*ty);
                self.dimss.push(dimensions.iter().map(|&d| if d > 0 { d as usize } else { 0 }).collect());
                Ok(())
            }
            other => anyhow::bail!("{CROSS_MARK} Tensor `{}` has unsupported type {:?}", name, other),
        }
    }
}

/// ONNXRuntime Backend
#[derive(Debug)]
pub struct OrtEngine {
    session: Session,
    inputs_attrs: OrtTensorAttr,
    outputs_attrs: OrtTensorAttr,
    model_width: u32,
    model_height: u32,
}

impl OrtEngine {
    pub fn new(config: &ConfigOrt) -> Result<Self> {
        if let Some(ort_lib_path) = &config.ort_lib_path {
            if let Err(e) = ort::init_from(ort_lib_path).commit() {
                log::error!("ORT commit failed! Error: {:?}", e);
                anyhow::bail!("Failed to commit ORT from {}: {:?}", ort_lib_path, e);
            }
        }

        let mut builder = Session::builder()?;

        let mut device = config.device;
        match device {
            InferenceDevice::TensorRT(device_id) => Self::build_trt(&mut builder, device_id).unwrap_or_else(|err| {
                log::warn!("{err}, Using cpu");
                device = InferenceDevice::CPU;
            }),
            InferenceDevice::CUDA(device_id) => Self::build_cuda(&mut builder, device_id).unwrap_or_else(|err| {
                log::warn!("{err}, Using cpu");
                device = InferenceDevice::CPU;
            }),
            InferenceDevice::CoreML => Self::build_coreml(&mut builder).unwrap_or_else(|err| {
                log::warn!("{err}, Using cpu");
                device = InferenceDevice::CPU;
            }),
            InferenceDevice::CPU => Self::build_cpu(&mut builder)?,
        }

        let session = builder
            .with_optimization_level(GraphOptimizationLevel::Level3)?
            .commit_from_file(&config.onnx_path)?;

        let mut inputs_attrs = OrtTensorAttr::default();
        for input in session.inputs.iter() {
            inputs_attrs.push(&input.name, &input.input_type)?;
        }
        let mut outputs_attrs = OrtTensorAttr::default();
        for output in session.outputs.iter() {
            outputs_attrs.push(&output.name, &output.output_type)?;
        }
        if inputs_attrs.names.is_empty() || outputs_attrs.names.is_empty() {
            anyhow::bail!("{CROSS_MARK} Model {} has no tensor inputs or outputs", config.onnx_path);
        }

        // static NCHW dims win over the configured size
        let dims = &inputs_attrs.dimss[0];
        let model_height = dims.get(2).copied().filter(|&d| d > 0).map_or(config.model_height, |d| d as u32);
        let model_width = dims.get(3).copied().filter(|&d| d > 0).map_or(config.model_width, |d| d as u32);

        log::info!(
            "Backend: ONNXRuntime | Device: {} | Input: {} {:?} {}x{}",
            device,
            inputs_attrs.names[0],
            inputs_attrs.dtypes[0],
            model_width,
            model_height,
        );

        Ok(Self {
            session,
            inputs_attrs,
            outputs_attrs,
            model_width,
            model_height,
        })
    }

    fn build_trt(builder: &mut SessionBuilder, device_id: usize) -> Result<()> {
        let trt = TensorRTExecutionProvider::default()
            .with_device_id(device_id as i32)
            .with_fp16(false)
            .with_engine_cache(true)
            .with_engine_cache_path("trt-cache");
        if trt.is_available()? {
            match trt.register(builder) {
                Ok(_) => { }
                Err(err) => { anyhow::bail!("{CROSS_MARK} TensorRT initialization failed: {:?}", err) }
            }
            log::info!("🐢 Initial model serialization with TensorRT may takes some time...");
            Ok(())
        } else {
            anyhow::bail!("{CROSS_MARK} TensorRT execution provider not available")
        }
    }

    fn build_cuda(builder: &mut SessionBuilder, device_id: usize) -> Result<()> {
        let ep = CUDAExecutionProvider::default()
            .with_device_id(device_id as i32);
        if ep.is_available()? {
            match ep.register(builder) {
                Ok(_) => { }
                Err(err) => { anyhow::bail!("{CROSS_MARK} CUDA initialization failed: {:?}", err) }
            }
            Ok(())
        } else {
            anyhow::bail!("{CROSS_MARK} CUDA execution provider not available")
        }
    }

    fn build_coreml(builder: &mut SessionBuilder) -> Result<()> {
        let ep = CoreMLExecutionProvider::default();
        if ep.is_available()? {
            match ep.register(builder) {
                Ok(_) => { }
                Err(err) => { anyhow::bail!("{CROSS_MARK} CoreML initialization failed: {:?}", err) }
            }
            Ok(())
        } else {
            anyhow::bail!("{CROSS_MARK} CoreML execution provider not available")
        }
    }

    fn build_cpu(builder: &mut SessionBuilder) -> Result<()> {
        let ep = CPUExecutionProvider::default();
        if ep.is_available()? {
            match ep.register(builder) {
                Ok(_) => { }
                Err(err) => { anyhow::bail!("{CROSS_MARK} CPU initialization failed: {:?}", err) }
            }
            Ok(())
        } else {
            anyhow::bail!("{CROSS_MARK} CPU execution provider not available")
        }
    }

    fn tensor_preprocess(x: X, dtype: &TensorElementType) -> Result<DynValue> {
        let x = match dtype {
            TensorElementType::Float32 => Tensor::from_array(x.0)?.into_dyn(),
            TensorElementType::Float16 => Tensor::from_array(x.mapv(f16::from_f32))?.into_dyn(),
            TensorElementType::Uint8 => Tensor::from_array(x.mapv(|x_| (x_ * 255.) as u8))?.into_dyn(),
            _ => anyhow::bail!("Unsupported model input type: {:?}", dtype),
        };
        Ok(x)
    }

    fn tensor_postprocess(x: &DynValue, dtype: &TensorElementType) -> Result<Array<f32, IxDyn>> {
        let x = match dtype {
            TensorElementType::Float32 => x.try_extract_tensor::<f32>()?.into_owned(),
            TensorElementType::Float16 => x.try_extract_tensor::<f16>()?.mapv(f16::to_f32),
            TensorElementType::Float64 => x.try_extract_tensor::<f64>()?.mapv(|x| x as f32),
            TensorElementType::Int64 => x.try_extract_tensor::<i64>()?.mapv(|x| x as f32),
            TensorElementType::Int32 => x.try_extract_tensor::<i32>()?.mapv(|x| x as f32),
            _ => anyhow::bail!("Unsupported ort tensor type: {:?}", dtype),
        };
        Ok(x)
    }

    /// Runs the session once, returning every output keyed by its name.
    pub fn engine_run(&self, xs: Xs) -> Result<Xs> {
        if xs.len() != self.inputs_attrs.names.len() {
            anyhow::bail!(
                "Model expects {} inputs, got {}",
                self.inputs_attrs.names.len(),
                xs.len()
            );
        }

        // alignment
        let mut xs_ = Vec::new();
        for (dtype, x) in self.inputs_attrs.dtypes.iter().zip(xs.into_iter()) {
            xs_.push(Into::<SessionInputValue<'_>>::into(Self::tensor_preprocess(x, dtype)?));
        }

        let outputs = self.session.run(&xs_[..])?;

        let mut ys = Xs::new();
        for (dtype, name) in self.outputs_attrs.dtypes.iter().zip(self.outputs_attrs.names.iter()) {
            let y = Self::tensor_postprocess(&outputs[name.as_str()], dtype)?;
            ys.push_kv(name.as_str(), X::from(y))?;
        }

        Ok(ys)
    }

    pub fn try_fetch(&self, key: &str) -> Option<String> {
        match self.session.metadata() {
            Err(_) => None,
            Ok(metadata) => metadata.custom(key).unwrap_or_default(),
        }
    }

    pub fn model_width(&self) -> u32 { self.model_width }

    pub fn model_height(&self) -> u32 { self.model_height }
}
