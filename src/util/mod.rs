#[inline]
pub fn is_alphabetic(c: char) -> bool {
    c.is_alphabetic() || c == '_'
}

#[inline]
pub fn is_numeric(c: char) -> bool {
    c.is_ascii_digit()
}

#[inline]
pub fn is_alphanumeric(c: char) -> bool {
    is_alphabetic(c) || is_numeric(c)
}

/// If less than this much stack remains, grow it before recursing.
const RED_ZONE: usize = 100 * 1024;

/// Stack space allocated per growth.
const STACK_PER_RECURSION: usize = 1024 * 1024;

/// Runs `f`, growing the stack first when the remaining space drops below the red zone.
///
/// Wraps the recursive entry points of the parser and the evaluator. Expression nesting is bounded by
/// the parser's nesting limit and guest recursion by the call depth limit; this covers the stack
/// those two limits allow.
#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, STACK_PER_RECURSION, f)
}

#[inline]
#[cfg(target_arch = "wasm32")]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}
