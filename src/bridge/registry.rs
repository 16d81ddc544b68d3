use std::collections::HashMap;
use std::fmt;

use rquickjs::Value;

use crate::bridge::dispatch::Invocation;
use crate::bridge::exception::HostResult;

/// Stable key a script wrapper passes back to the proxy to select its host function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FunctionId(pub u32);

impl fmt::Display for FunctionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

pub type HostFn = Box<
    dyn for<'a, 'js> Fn(&Invocation<'a, 'js>, Value<'js>, &[Value<'js>]) -> HostResult<Value<'js>>,
>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("host function already registered: {0}")]
    DuplicateName(String),
    #[error("invalid host function name: {0:?}")]
    InvalidName(String),
    #[error("host function registry is full")]
    Full,
}

pub struct HostEntry {
    name: String,
    func: HostFn,
}

impl HostEntry {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn call<'a, 'js>(
        &self,
        invocation: &Invocation<'a, 'js>,
        this: Value<'js>,
        args: &[Value<'js>],
    ) -> HostResult<Value<'js>> {
        (self.func)(invocation, this, args)
    }
}

/// Host functions keyed by [`FunctionId`], filled before installation and
/// read-only once handed to a context.
#[derive(Default)]
pub struct HostRegistry {
    entries: Vec<HostEntry>,
    by_name: HashMap<String, FunctionId>,
}

impl HostRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<F>(&mut self, name: impl Into<String>, func: F) -> Result<FunctionId, RegistryError>
    where
        F: for<'a, 'js> Fn(&Invocation<'a, 'js>, Value<'js>, &[Value<'js>]) -> HostResult<Value<'js>>
            + 'static,
    {
        let name = name.into();
        if name.is_empty() || name.chars().any(char::is_whitespace) {
            return Err(RegistryError::InvalidName(name));
        }
        if self.by_name.contains_key(&name) {
            return Err(RegistryError::DuplicateName(name));
        }

        let id = u32::try_from(self.entries.len())
            .map(FunctionId)
            .map_err(|_| RegistryError::Full)?;

        tracing::debug!(%id, name = %name, "registered host function");

        self.by_name.insert(name.clone(), id);
        self.entries.push(HostEntry {
            name,
            func: Box::new(func),
        });
        Ok(id)
    }

    pub fn get(&self, id: FunctionId) -> Option<&HostEntry> {
        self.entries.get(id.0 as usize)
    }

    pub fn id_of(&self, name: &str) -> Option<FunctionId> {
        self.by_name.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Names in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(HostEntry::name)
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = (FunctionId, &HostEntry)> {
        self.entries
            .iter()
            .enumerate()
            .map(|(idx, entry)| (FunctionId(idx as u32), entry))
    }
}

impl fmt::Debug for HostRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostRegistry")
            .field("functions", &self.names().collect::<Vec<_>>())
            .finish()
    }
}
