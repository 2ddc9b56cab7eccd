//! # TransitionRouter: Request-Scoped Dispatch
//!
//! After each knot completes, the transition it returned is looked up in the
//! current [`TransitionTable`]. A mapped transition moves on to the next
//! knot with that entry's nested table; anything else ends the pipeline.
//!
//! The walk is an explicit loop so deep chains never grow the stack.

use crate::proxy::{DeliveryOptions, KnotProxy};
use crate::registry::KnotRegistry;
use crate::routing::TransitionTable;
use knotwork_core::{KnotContext, KnotError};
use parking_lot::RwLock;
use std::collections::HashMap;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RouterError {
    #[error("No knot registered at address '{0}'")]
    UnknownAddress(String),
    #[error("Knot '{address}' failed: {source}")]
    StageExecution {
        address: String,
        #[source]
        source: KnotError,
    },
}

/// Why the pipeline stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Termination {
    /// The last knot returned no transition.
    Finished { address: String },
    /// The last knot returned a transition the table does not map.
    UnresolvedTransition { address: String, transition: String },
}

impl Termination {
    pub fn address(&self) -> &str {
        match self {
            Termination::Finished { address } => address,
            Termination::UnresolvedTransition { address, .. } => address,
        }
    }
}

/// The context produced by the last knot, ready for response assembly.
#[derive(Debug)]
pub struct Routed {
    pub context: KnotContext,
    pub termination: Termination,
    /// Number of knots executed.
    pub hops: usize,
}

pub struct TransitionRouter {
    registry: KnotRegistry,
    options: DeliveryOptions,
    /// Lazily populated, one proxy per address for the router's lifetime.
    proxies: RwLock<HashMap<String, KnotProxy>>,
}

impl TransitionRouter {
    pub fn new(registry: KnotRegistry, options: DeliveryOptions) -> Self {
        Self {
            registry,
            options,
            proxies: RwLock::new(HashMap::new()),
        }
    }

    pub fn registry(&self) -> &KnotRegistry {
        &self.registry
    }

    /// Number of proxies created so far.
    pub fn cached_proxies(&self) -> usize {
        self.proxies.read().len()
    }

    fn proxy(&self, address: &str) -> Result<KnotProxy, RouterError> {
        if let Some(proxy) = self.proxies.read().get(address) {
            return Ok(proxy.clone());
        }

        let mut proxies = self.proxies.write();
        if let Some(proxy) = proxies.get(address) {
            return Ok(proxy.clone());
        }
        let knot = self
            .registry
            .get(address)
            .ok_or_else(|| RouterError::UnknownAddress(address.to_string()))?;
        let proxy = KnotProxy::new(address, knot, self.options);
        proxies.insert(address.to_string(), proxy.clone());
        Ok(proxy)
    }

    /// Run `context` through the knot at `address`, then keep following
    /// transitions through `routing` until one is not mapped.
    pub async fn route(
        &self,
        context: KnotContext,
        address: &str,
        routing: &TransitionTable,
    ) -> Result<Routed, RouterError> {
        let mut context = context;
        let mut address = address.to_string();
        let mut routing = routing;
        let mut hops = 0;

        loop {
            let proxy = self.proxy(&address)?;
            context.transition = None;
            context = proxy
                .process(context)
                .await
                .map_err(|source| RouterError::StageExecution {
                    address: address.clone(),
                    source,
                })?;
            hops += 1;

            let Some(transition) = context.transition.clone() else {
                tracing::debug!(
                    "Request processing finished by {} Knot. Go to the response generation",
                    address
                );
                return Ok(Routed {
                    context,
                    termination: Termination::Finished { address },
                    hops,
                });
            };

            match routing.get(&transition) {
                Some(entry) => {
                    tracing::debug!(%transition, from = %address, to = %entry.address, "Following transition");
                    address = entry.address.clone();
                    routing = &entry.on_transition;
                }
                None => {
                    tracing::debug!(
                        "Received transition '{}' from '{}'. No further routing available for the transition. Go to the response generation.",
                        transition,
                        address
                    );
                    return Ok(Routed {
                        context,
                        termination: Termination::UnresolvedTransition {
                            address,
                            transition,
                        },
                        hops,
                    });
                }
            }
        }
    }
}

impl std::fmt::Debug for TransitionRouter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransitionRouter")
            .field("registry", &self.registry)
            .field("options", &self.options)
            .field("cached_proxies", &self.cached_proxies())
            .finish()
    }
}
