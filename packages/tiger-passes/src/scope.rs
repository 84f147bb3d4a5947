//! Scoped symbol environment.

use std::collections::HashMap;

use tiger_parser::ast::Ident;

/// A stack of name-to-value frames with nearest-enclosing lookup, plus the
/// current function nesting depth.
///
/// Frames follow lexical block and function boundaries in strict LIFO
/// order. The depth counter is independent of the frame stack: entering a
/// `let` block pushes a frame but does not change depth; only entering a
/// function body does.
///
/// Unbalanced use is a defect in the traversal driving this environment,
/// never a property of the input program, so it panics instead of returning
/// an error.
#[derive(Debug)]
pub struct ScopedEnv<V> {
    frames: Vec<HashMap<Ident, V>>,
    depth: u32,
}

impl<V> ScopedEnv<V> {
    /// Create an environment with the root scope already open at depth 0.
    pub fn new() -> Self {
        Self {
            frames: vec![HashMap::new()],
            depth: 0,
        }
    }

    /// Open a new scope. Bindings added until the matching [`scope_end`]
    /// shadow same-named bindings in outer scopes.
    ///
    /// [`scope_end`]: Self::scope_end
    pub fn scope_begin(&mut self) {
        self.frames.push(HashMap::new());
    }

    /// Close the innermost scope, discarding its bindings.
    pub fn scope_end(&mut self) {
        self.frames
            .pop()
            .expect("scope_end called without a matching scope_begin");
    }

    /// Bind `name` in the innermost scope.
    pub fn put(&mut self, name: Ident, value: V) {
        self.frames
            .last_mut()
            .expect("put called with no open scope")
            .insert(name, value);
    }

    /// Look `name` up, innermost scope first.
    pub fn get(&self, name: &Ident) -> Option<&V> {
        self.frames.iter().rev().find_map(|frame| frame.get(name))
    }

    pub fn enter_function(&mut self) {
        self.depth += 1;
    }

    pub fn exit_function(&mut self) {
        self.depth = self
            .depth
            .checked_sub(1)
            .expect("exit_function called at depth 0");
    }

    /// The current function nesting depth.
    pub fn depth(&self) -> u32 {
        self.depth
    }

    /// Tear the environment down, checking that every `scope_begin` and
    /// `enter_function` was matched.
    pub fn finish(mut self) {
        assert_eq!(self.depth, 0, "environment finished at non-zero depth");
        self.frames
            .pop()
            .expect("environment finished with no root scope");
        assert!(
            self.frames.is_empty(),
            "environment finished with unclosed scopes"
        );
    }
}

impl<V> Default for ScopedEnv<V> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_finds_innermost_binding() {
        let mut env = ScopedEnv::new();
        env.put(Ident::new("x"), 1);
        env.scope_begin();
        env.put(Ident::new("x"), 2);
        assert_eq!(env.get(&Ident::new("x")), Some(&2));
        env.scope_end();
        assert_eq!(env.get(&Ident::new("x")), Some(&1));
        assert_eq!(env.get(&Ident::new("y")), None);
        env.finish();
    }

    #[test]
    fn depth_is_independent_of_block_scopes() {
        let mut env: ScopedEnv<()> = ScopedEnv::new();
        assert_eq!(env.depth(), 0);
        env.scope_begin();
        assert_eq!(env.depth(), 0);
        env.enter_function();
        env.scope_begin();
        assert_eq!(env.depth(), 1);
        env.scope_end();
        env.exit_function();
        env.scope_end();
        assert_eq!(env.depth(), 0);
        env.finish();
    }

    #[test]
    #[should_panic(expected = "scope_end called without a matching scope_begin")]
    fn unbalanced_scope_end_panics() {
        let mut env: ScopedEnv<()> = ScopedEnv::new();
        env.scope_end(); // pops the root scope
        env.scope_end();
    }

    #[test]
    #[should_panic(expected = "exit_function called at depth 0")]
    fn exit_function_at_depth_zero_panics() {
        let mut env: ScopedEnv<()> = ScopedEnv::new();
        env.exit_function();
    }

    #[test]
    #[should_panic(expected = "environment finished with unclosed scopes")]
    fn finish_with_open_scope_panics() {
        let mut env: ScopedEnv<()> = ScopedEnv::new();
        env.scope_begin();
        env.finish();
    }
}
