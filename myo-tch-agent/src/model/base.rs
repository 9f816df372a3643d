//! Definition of interfaces of neural networks.
use anyhow::Result;
use std::path::Path;
use tch::{nn, nn::VarStore, Tensor};

/// Base interface of trainable models.
pub trait ModelBase {
    /// Trains the network given a loss.
    fn backward_step(&mut self, loss: &Tensor);

    /// Returns `var_store` as mutable reference.
    fn get_var_store_mut(&mut self) -> &mut nn::VarStore;

    /// Returns `var_store`.
    fn get_var_store(&self) -> &nn::VarStore;

    /// Save parameters of the neural network.
    fn save<T: AsRef<Path>>(&self, path: T) -> Result<()>;

    /// Load parameters of the neural network.
    fn load<T: AsRef<Path>>(&mut self, path: T) -> Result<()>;
}

/// A network that can be initialized from a [`VarStore`] and a
/// configuration.
///
/// Modules consisting a network share a [`VarStore`]; target networks are
/// created by cloning with a fresh store and copying the variables.
///
/// [`VarStore`]: https://docs.rs/tch/0.16.0/tch/nn/struct.VarStore.html
pub trait Buildable {
    /// Configuration from which the network is constructed.
    type Config: Clone;

    /// Builds the network with the given [`VarStore`] and configuration.
    fn build(var_store: &VarStore, config: Self::Config) -> Self;

    /// Clones the network with a given [`VarStore`].
    fn clone_with_var_store(&self, var_store: &VarStore) -> Self;
}

/// A stateless network with a single input.
pub trait SubModel: Buildable {
    /// Input of the network.
    type Input;

    /// Output of the network.
    type Output;

    /// Performs forward computation given an input.
    fn forward(&self, input: &Self::Input) -> Self::Output;
}

/// A stateless network with two inputs.
pub trait SubModel2: Buildable {
    /// First input of the network.
    type Input1;

    /// Second input of the network.
    type Input2;

    /// Output of the network.
    type Output;

    /// Performs forward computation given a pair of inputs.
    fn forward(&self, input1: &Self::Input1, input2: &Self::Input2) -> Self::Output;
}

/// A recurrent or spiking network with a single input.
///
/// Carries state (hidden/cell tensors or per-layer membrane potentials)
/// across steps of one episode. The state for the start of an episode is
/// produced by [`zero_state`](StatefulModel::zero_state).
pub trait StatefulModel: Buildable {
    /// State carried across steps.
    type State;

    /// Output of the network.
    type Output;

    /// Returns the state for the start of a fresh sequence.
    fn zero_state(&self, batch_size: i64) -> Self::State;

    /// Advances the network one step. `input` has shape
    /// `[batch, features]`.
    fn step(&self, input: &Tensor, state: Self::State) -> (Self::Output, Self::State);

    /// Runs the network over a whole sequence `[batch, len, features]`,
    /// re-initializing the state at `t = 0`. Outputs keep the time axis.
    fn seq(&self, input: &Tensor) -> Self::Output;
}

/// A recurrent or spiking network with two inputs, used for sequence
/// critics. Only whole-sequence evaluation is needed during training.
pub trait StatefulModel2: Buildable {
    /// Output of the network.
    type Output;

    /// Runs the network over whole sequences `[batch, len, features]`,
    /// re-initializing the internal state at `t = 0`.
    fn seq(&self, input1: &Tensor, input2: &Tensor) -> Self::Output;
}
