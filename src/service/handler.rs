//! Request handlers and their calling convention.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::codec::{IntoOutput, Output};
use crate::service::binder::{Binding, FromContext, ParameterSlot};
use crate::service::error::Error;

/// Type alias for a boxed future that resolves to the handler's result.
pub type HandlerFuture = Pin<Box<dyn Future<Output = Result<Output, Error>> + Send>>;

/// Type alias for a handler erased to "fill the plan, then run".
pub type HandlerFn = Arc<dyn Fn(&[ParameterSlot], &Binding<'_>) -> HandlerFuture + Send + Sync>;

/// An async function whose parameters are all [`FromContext`] types.
///
/// Implemented for functions and closures of up to eight parameters, in any
/// order. `T` is the parameter tuple and only serves to keep the impls apart.
pub trait Handler<T>: Send + Sync + 'static {
    /// One slot per parameter, in declared order.
    fn plan() -> Vec<ParameterSlot>;

    /// Bind every parameter and start the handler.
    fn call(&self, plan: &[ParameterSlot], binding: &Binding<'_>) -> HandlerFuture;
}

pub(crate) fn erase<H, T>(handler: H) -> HandlerFn
where
    H: Handler<T>,
{
    Arc::new(move |plan: &[ParameterSlot], binding: &Binding<'_>| handler.call(plan, binding))
}

macro_rules! impl_handler {
    ($($param:ident),*) => {
        impl<F, Fut, R, $($param,)*> Handler<($($param,)*)> for F
        where
            F: Fn($($param),*) -> Fut + Send + Sync + 'static,
            Fut: Future<Output = R> + Send + 'static,
            R: IntoOutput,
            $($param: FromContext,)*
        {
            fn plan() -> Vec<ParameterSlot> {
                vec![$($param::slot()),*]
            }

            #[allow(non_snake_case, unused_variables, unused_mut)]
            fn call(&self, plan: &[ParameterSlot], binding: &Binding<'_>) -> HandlerFuture {
                let mut slots = plan.iter();
                $(
                    let $param = match slots.next() {
                        Some(slot) => $param::bind(slot, binding),
                        None => $param::bind(&$param::slot(), binding),
                    };
                )*
                let future = (self)($($param),*);
                Box::pin(async move { future.await.into_output() })
            }
        }
    };
}

impl_handler!();
impl_handler!(A1);
impl_handler!(A1, A2);
impl_handler!(A1, A2, A3);
impl_handler!(A1, A2, A3, A4);
impl_handler!(A1, A2, A3, A4, A5);
impl_handler!(A1, A2, A3, A4, A5, A6);
impl_handler!(A1, A2, A3, A4, A5, A6, A7);
impl_handler!(A1, A2, A3, A4, A5, A6, A7, A8);
