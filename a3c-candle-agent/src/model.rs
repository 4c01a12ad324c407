//! Global and local parameters of the policy and value networks.
mod config;
use crate::{a3c_loss, net::PolicyValueNet, opt::Optimizer};
use a3c_core::{
    record::{Record, RecordValue},
    A3cError, PolicyValue, PolicyValueModel, RolloutBatch, State,
};
use anyhow::{anyhow, Result};
pub use config::{A3cModelConfig, TrunkConfig};
use candle_core::{DType, Device, Tensor, Var};
use candle_nn::{VarBuilder, VarMap};
use log::info;
use std::path::Path;

/// Variables of a [`VarMap`] sorted by name.
///
/// Replicas built from the same configuration have the same names, so zipping two lists
/// pairs corresponding variables.
fn sorted_vars(varmap: &VarMap) -> Result<Vec<(String, Var)>> {
    let data = varmap
        .data()
        .lock()
        .map_err(|_| anyhow!("lock of variables failed"))?;
    let mut vars = data
        .iter()
        .map(|(name, var)| (name.clone(), var.clone()))
        .collect::<Vec<_>>();
    vars.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(vars)
}

fn build_net(config: &A3cModelConfig, device: &Device) -> Result<(VarMap, PolicyValueNet)> {
    let varmap = VarMap::new();
    let net = {
        let vb = VarBuilder::from_varmap(&varmap, DType::F32, device);
        PolicyValueNet::build(vb, config)?
    };
    Ok((varmap, net))
}

/// Private replica of the parameters owned by an actor-learner.
pub struct A3cLocal {
    // Owns the variables referenced by `net` and `vars`.
    _varmap: VarMap,
    vars: Vec<(String, Var)>,
    net: PolicyValueNet,
}

/// Optimizer of an actor-learner, bound to the global parameters.
pub struct A3cUpdater {
    opt: Optimizer,
    n_updates: usize,
}

impl A3cUpdater {
    /// The number of updates applied with this updater.
    pub fn n_updates(&self) -> usize {
        self.n_updates
    }
}

/// Policy and value networks implemented with candle.
///
/// The model holds the global parameters. Its variables are updated in place by the
/// optimizers of the actor-learners; a write to a variable replaces its whole storage under
/// the storage lock of the variable, so readers never see a partially written variable.
pub struct A3cModel {
    config: A3cModelConfig,
    device: Device,
    varmap: VarMap,
    vars: Vec<(String, Var)>,
    net: PolicyValueNet,
}

impl A3cModel {
    /// Constructs a model with randomly initialized parameters.
    pub fn build(config: A3cModelConfig) -> Result<Self> {
        let device = config.device.build()?;
        let (varmap, net) = build_net(&config, &device)?;
        let vars = sorted_vars(&varmap)?;
        info!(
            "Build model with {} variables, {} actions",
            vars.len(),
            config.n_actions
        );

        Ok(Self {
            config,
            device,
            varmap,
            vars,
            net,
        })
    }

    /// Configuration of the model.
    pub fn config(&self) -> &A3cModelConfig {
        &self.config
    }

    /// Converts states into a tensor of shape `(batch, n_stack, height, width)`.
    fn states_to_tensor(&self, states: &[State]) -> Result<Tensor> {
        let shape = (self.config.n_stack, self.config.height, self.config.width);
        let mut data = Vec::<f32>::with_capacity(states.len() * shape.0 * shape.1 * shape.2);
        for state in states.iter() {
            if state.dim() != shape {
                return Err(A3cError::Configuration(format!(
                    "state of shape {:?} given to a model for {:?}",
                    state.dim(),
                    shape
                ))
                .into());
            }
            data.extend(state.frames().iter().copied());
        }
        Ok(Tensor::from_vec(
            data,
            (states.len(), shape.0, shape.1, shape.2),
            &self.device,
        )?)
    }

    fn evaluate(&self, net: &PolicyValueNet, state: &State) -> Result<PolicyValue> {
        let xs = self.states_to_tensor(std::slice::from_ref(state))?;
        let (probs, values) = net.forward(&xs)?;
        Ok(PolicyValue {
            probs: probs.squeeze(0)?.to_vec1::<f32>()?,
            value: values.squeeze(0)?.to_scalar::<f32>()?,
        })
    }
}

impl PolicyValueModel for A3cModel {
    type Local = A3cLocal;
    type Updater = A3cUpdater;

    fn n_actions(&self) -> usize {
        self.config.n_actions
    }

    fn forward(&self, state: &State) -> Result<PolicyValue> {
        self.evaluate(&self.net, state)
    }

    fn forward_local(&self, local: &Self::Local, state: &State) -> Result<PolicyValue> {
        self.evaluate(&local.net, state)
    }

    fn new_local(&self) -> Result<Self::Local> {
        let (varmap, net) = build_net(&self.config, &self.device)?;
        let vars = sorted_vars(&varmap)?;
        Ok(A3cLocal {
            _varmap: varmap,
            vars,
            net,
        })
    }

    fn copy_parameters_into(&self, local: &mut Self::Local) -> Result<()> {
        for ((name, src), (_, dest)) in self.vars.iter().zip(local.vars.iter()) {
            dest.set(src.as_tensor())
                .map_err(|e| anyhow!("failed to copy {}: {}", name, e))?;
        }
        Ok(())
    }

    fn new_updater(&self) -> Result<Self::Updater> {
        let vars = self.vars.iter().map(|(_, v)| v.clone()).collect();
        Ok(A3cUpdater {
            opt: self.config.opt.build(vars)?,
            n_updates: 0,
        })
    }

    fn gradient_update(&self, updater: &mut Self::Updater, batch: &RolloutBatch) -> Result<Record> {
        let n = batch.len();
        let n_actions = self.config.n_actions;
        let xs = self.states_to_tensor(&batch.states)?;
        let actions = Tensor::from_vec(
            batch.actions.iter().flatten().copied().collect::<Vec<_>>(),
            (n, n_actions),
            &self.device,
        )?;
        let targets = Tensor::from_vec(batch.targets.clone(), n, &self.device)?;

        let (probs, values) = self.net.forward(&xs)?;
        let loss = a3c_loss(&probs, &values, &actions, &targets, self.config.entropy_beta)?;
        updater.opt.backward_step(&loss.total)?;
        updater.n_updates += 1;

        Ok(Record::from_slice(&[
            ("loss", RecordValue::Scalar(loss.total.to_scalar::<f32>()?)),
            ("loss_policy", RecordValue::Scalar(loss.policy.to_scalar::<f32>()?)),
            ("loss_value", RecordValue::Scalar(loss.value.to_scalar::<f32>()?)),
            ("entropy", RecordValue::Scalar(loss.entropy.to_scalar::<f32>()?)),
        ]))
    }

    fn save_params(&self, path: &Path) -> Result<()> {
        self.varmap
            .save(path)
            .map_err(|e| A3cError::CheckpointIo {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;
        info!("Save model to {:?}", path);
        Ok(())
    }

    fn load_params(&self, path: &Path) -> Result<()> {
        let io_error = |reason: String| A3cError::CheckpointIo {
            path: path.display().to_string(),
            reason,
        };
        let tensors = candle_core::safetensors::load(path, &self.device)
            .map_err(|e| io_error(e.to_string()))?;

        for (name, var) in self.vars.iter() {
            let t = tensors
                .get(name)
                .ok_or_else(|| io_error(format!("variable {} is missing", name)))?;
            var.set(t).map_err(|e| io_error(format!("variable {}: {}", name, e)))?;
        }
        info!("Load model from {:?}", path);
        Ok(())
    }
}
