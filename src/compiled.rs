//! Runtime surface of generated factories

use crate::{Instance, Options, Result, ServiceLocator};

/// How a factory was invoked.
///
/// `Legacy` covers callers that still pass the requested name alongside an
/// optional options map.
#[derive(Debug, Clone, PartialEq)]
pub enum FactoryCall {
    Options(Options),
    Legacy {
        requested: String,
        options: Option<Options>,
    },
}

impl FactoryCall {
    /// The options to build with. A legacy call without a map builds with none.
    pub fn into_options(self) -> Options {
        match self {
            Self::Options(options) => options,
            Self::Legacy { options, .. } => options.unwrap_or_default(),
        }
    }
}

impl From<Options> for FactoryCall {
    fn from(options: Options) -> Self {
        Self::Options(options)
    }
}

/// A generated, ahead-of-time factory for one class.
///
/// When `options` is empty the factory uses its resolved parameters directly;
/// otherwise each entry replaces the parameter of the same name.
pub trait CompiledFactory: Send + Sync {
    fn create(&self, container: &dyn ServiceLocator, options: &Options) -> Result<Instance>;

    /// Entry point accepting both calling conventions
    fn invoke(&self, container: &dyn ServiceLocator, call: FactoryCall) -> Result<Instance> {
        self.create(container, &call.into_options())
    }
}
