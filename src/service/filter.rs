//! Pre- and post-dispatch filters.

use std::sync::Arc;

use crate::codec::Output;
use crate::service::context::RequestContext;

/// Runs before the handler. Returning `Some` ends the request with that result.
pub type InFilter = Arc<dyn Fn(&mut RequestContext) -> Option<Output> + Send + Sync>;

/// Runs after the handler (or a short-circuiting in-filter). Returns the
/// possibly replaced result and whether it is final.
pub type OutFilter = Arc<dyn Fn(&mut RequestContext, Output) -> (Output, bool) + Send + Sync>;

/// Filters in registration order.
#[derive(Clone, Default)]
pub struct FilterChain {
    in_filters: Vec<InFilter>,
    out_filters: Vec<OutFilter>,
}

impl FilterChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_in_filter(&mut self, filter: InFilter) {
        self.in_filters.push(filter);
    }

    pub fn add_out_filter(&mut self, filter: OutFilter) {
        self.out_filters.push(filter);
    }

    /// The first result an in-filter produces, if any. Later filters do not run.
    pub fn run_in(&self, ctx: &mut RequestContext) -> Option<Output> {
        self.in_filters.iter().find_map(|filter| filter(ctx))
    }

    /// Pass `output` through the out-filters until one marks it final.
    pub fn run_out(&self, ctx: &mut RequestContext, mut output: Output) -> Output {
        for filter in &self.out_filters {
            let (next, is_final) = filter(ctx, output);
            output = next;
            if is_final {
                break;
            }
        }
        output
    }
}
