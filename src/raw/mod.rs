mod balance;
mod handle;
mod meta;
mod node;
mod overlay;
mod tree;
#[cfg(test)]
mod validate;

pub(crate) use handle::Handle;
pub(crate) use tree::RawTree;
