use ahash::AHashSet;
use cancel_this::{is_cancelled, Cancelled};
use kdd::Storage;
use log::{debug, info, trace};

use crate::{bindings, enabled_bindings, fire, optimize, Error, Evaluator, Key, Label, Marking, Net, Value};

/// Limits of a state space exploration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExplorationConfig
{
    /// Cancel the exploration if it exceeds the specified number of iterations, i.e., frontiers (default: `usize::MAX`).
    pub max_iterations: usize,
    /// Cancel the exploration if it finds more than the specified number of markings (default: `usize::MAX`).
    pub max_states: usize,
    /// Clear the operation caches after an iteration that leaves more than the specified number of cached results (default: `1 << 22`).
    pub max_cache_size: usize,
}

impl ExplorationConfig
{
    pub fn new() -> Self
    {
        ExplorationConfig {
            max_iterations: usize::MAX,
            max_states: usize::MAX,
            max_cache_size: 1 << 22,
        }
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self
    {
        self.max_iterations = max_iterations;
        self
    }

    pub fn with_max_states(mut self, max_states: usize) -> Self
    {
        self.max_states = max_states;
        self
    }

    pub fn with_max_cache_size(mut self, max_cache_size: usize) -> Self
    {
        self.max_cache_size = max_cache_size;
        self
    }
}

impl Default for ExplorationConfig
{
    fn default() -> Self
    {
        Self::new()
    }
}

/// Returns every marking that is reachable from the initial marking, including the initial marking itself.
///
/// The net is statically optimized once, after which every marking of the
/// frontier is expanded by firing all enabled bindings of all transitions.
///
/// Diagram nodes are never freed, so the node table grows with every
/// (marking, transition) pair that is expanded and stays allocated for the
/// lifetime of the storage. The operation caches are cleared whenever they
/// exceed [ExplorationConfig::max_cache_size], which does not affect results.
pub fn explore<P: Label, T: Label>(
    storage: &mut Storage<Key, Value>,
    evaluator: &mut impl Evaluator,
    net: &Net<P, T>,
    initial: &Marking<P>,
    config: &ExplorationConfig,
) -> Result<AHashSet<Marking<P>>, Error>
{
    let optimized = optimize(net, evaluator)?;
    let net = &optimized.net;

    let mut seen = AHashSet::new();
    seen.insert(initial.clone());
    let mut frontier = vec![initial.clone()];
    let mut iteration = 0;

    while !frontier.is_empty()
    {
        if iteration >= config.max_iterations {
            debug!("[iteration:{}] Exploration canceled (exceeded iteration count).", iteration);
            return Err(Cancelled::new("ExplorationConfig::max_iterations").into());
        }
        iteration += 1;

        let mut next = Vec::new();
        for marking in frontier.iter()
        {
            is_cancelled!()?;

            for transition in net.transitions()
            {
                let root = enabled_bindings(storage, evaluator, net, transition, marking)?;

                // Firing only needs the evaluator, so the bindings are enumerated lazily.
                for binding in bindings(storage, root)
                {
                    let successor = match fire(net, transition, marking, &binding, evaluator)? {
                        Some(successor) => successor,
                        None => continue,
                    };

                    if seen.contains(&successor) {
                        continue;
                    }

                    trace!("Found {} by firing {:?}.", successor, transition);
                    seen.insert(successor.clone());
                    if seen.len() > config.max_states {
                        debug!("[iteration:{}] Exploration canceled (exceeded state count).", iteration);
                        return Err(Cancelled::new("ExplorationConfig::max_states").into());
                    }

                    next.push(successor);
                }
            }
        }

        let (hits, misses) = storage.cache().statistics();
        debug!(
            "[iteration:{}] Explored {} markings, found {} new markings ({} in total, {} diagram nodes, {} cache hits, {} cache misses).",
            iteration,
            frontier.len(),
            next.len(),
            seen.len(),
            storage.node_count(),
            hits,
            misses
        );

        if storage.cache().len() > config.max_cache_size {
            debug!("[iteration:{}] Clearing {} cached results.", iteration, storage.cache().len());
            storage.clear_caches();
        }
        frontier = next;
    }

    info!("Exploration finished with {} markings after {} iterations.", seen.len(), iteration);
    Ok(seen)
}
