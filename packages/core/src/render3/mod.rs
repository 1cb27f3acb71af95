//! Incremental DOM-style rendering runtime.
//!
//! Compiled templates drive a [`Runtime`] through instructions. Each view
//! keeps its nodes and binding values in one flat array; static data shared
//! by every instance of a template lives in a parallel [`TView`].
//!
//! [`TView`]: interfaces::view::TView

pub mod arena;
pub(crate) mod assert;
pub mod bindings;
pub mod component;
pub mod debug;
pub mod di;
pub mod event_emitter;
pub mod hooks;
pub mod instructions;
pub mod interfaces;
pub mod node_manipulation;
pub mod node_selector_matcher;
pub mod projection;
pub mod runtime;
pub mod value;

pub use component::{ComponentFeature, ComponentRef, CreateComponentOptions};
pub use di::{bloom_bit, NodeInjector, BLOOM_SIZE};
pub use event_emitter::{EventEmitter, Subscription};
pub use instructions::ElementName;
pub use interfaces::definition::{
    downcast_directive, downcast_directive_mut, ComponentDef, Directive, DirectiveDef, DirectiveRef,
};
pub use interfaces::node::{NodeId, NodeKind, TAttribute, TAttributes};
pub use interfaces::projection::{CssSelector, CssSelectorList, SelectorToken};
pub use interfaces::renderer::{EventListener, RNode, Renderer3, RendererFactory3, Unlisten};
pub use interfaces::view::ViewId;
pub use runtime::Runtime;
pub use value::{Bound, Value, NO_CHANGE};
