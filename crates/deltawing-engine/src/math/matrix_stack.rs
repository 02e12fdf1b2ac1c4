use std::fmt;

use glam::{Mat4, Vec3};

/// Maximum number of entries a [`MatrixStack`] holds.
pub const MATRIX_STACK_CAPACITY: usize = 127;

/// Failure of a matrix stack operation. The stack is left unchanged.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum MatrixStackError {
    Overflow,
    Underflow,
}

impl fmt::Display for MatrixStackError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Overflow => write!(f, "matrix stack overflow (capacity {MATRIX_STACK_CAPACITY})"),
            Self::Underflow => write!(f, "matrix stack underflow"),
        }
    }
}

impl std::error::Error for MatrixStackError {}

/// Bounded stack of model transforms.
///
/// The scene layer scopes a transform with
///
/// ```ignore
/// stack.push_copy()?;
/// stack.translate(pos)?;
/// stack.rotate(angle, Vec3::Z)?;
/// // ... draw ...
/// stack.pop()?;
/// ```
///
/// Renderers only ever read the top entry. Every failure is logged at warn
/// level; repeated warnings point at a push/pop imbalance in the caller.
#[derive(Debug, Clone)]
pub struct MatrixStack {
    entries: Vec<Mat4>,
}

impl MatrixStack {
    /// Creates an empty stack.
    pub fn new() -> Self {
        Self { entries: Vec::with_capacity(MATRIX_STACK_CAPACITY) }
    }

    /// Creates a stack holding `base` as its only entry.
    pub fn with_base(base: Mat4) -> Self {
        let mut entries = Vec::with_capacity(MATRIX_STACK_CAPACITY);
        entries.push(base);
        Self { entries }
    }

    /// Number of entries currently on the stack.
    #[inline]
    pub fn depth(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Pushes `m` as the new top entry.
    pub fn push(&mut self, m: Mat4) -> Result<(), MatrixStackError> {
        if self.entries.len() >= MATRIX_STACK_CAPACITY {
            return Err(report(MatrixStackError::Overflow));
        }
        self.entries.push(m);
        Ok(())
    }

    /// Removes and returns the top entry.
    pub fn pop(&mut self) -> Result<Mat4, MatrixStackError> {
        self.entries.pop().ok_or_else(|| report(MatrixStackError::Underflow))
    }

    /// Returns the top entry without removing it.
    pub fn peek(&self) -> Result<Mat4, MatrixStackError> {
        self.entries.last().copied().ok_or_else(|| report(MatrixStackError::Underflow))
    }

    /// Duplicates the top entry, opening a scope for in-place mutation.
    pub fn push_copy(&mut self) -> Result<(), MatrixStackError> {
        let top = self.peek()?;
        self.push(top)
    }

    /// Post-multiplies the top entry by a translation.
    pub fn translate(&mut self, v: Vec3) -> Result<(), MatrixStackError> {
        let top = self.top_mut()?;
        *top *= Mat4::from_translation(v);
        Ok(())
    }

    /// Post-multiplies the top entry by a rotation of `angle` radians about `axis`.
    ///
    /// A zero-length axis leaves the entry untouched.
    pub fn rotate(&mut self, angle: f32, axis: Vec3) -> Result<(), MatrixStackError> {
        let top = self.top_mut()?;
        match axis.try_normalize() {
            Some(axis) => *top *= Mat4::from_axis_angle(axis, angle),
            None => log::warn!("matrix stack: ignoring rotation about a zero-length axis"),
        }
        Ok(())
    }

    fn top_mut(&mut self) -> Result<&mut Mat4, MatrixStackError> {
        self.entries.last_mut().ok_or_else(|| report(MatrixStackError::Underflow))
    }
}

impl Default for MatrixStack {
    fn default() -> Self {
        Self::new()
    }
}

fn report(err: MatrixStackError) -> MatrixStackError {
    log::warn!("{err}");
    err
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(x: f32) -> Mat4 {
        Mat4::from_translation(Vec3::new(x, 0.0, 0.0))
    }

    #[test]
    fn new_stack_is_empty() {
        let s = MatrixStack::new();
        assert!(s.is_empty());
        assert_eq!(s.peek(), Err(MatrixStackError::Underflow));
    }

    #[test]
    fn with_base_starts_at_depth_one() {
        let base = Mat4::from_translation(Vec3::new(1.0, 2.0, 0.0));
        let mut stack = MatrixStack::with_base(base);
        assert_eq!(stack.depth(), 1);
        assert_eq!(stack.peek().unwrap(), base);
        for _ in 1..MATRIX_STACK_CAPACITY {
            stack.push_copy().unwrap();
        }
        assert_eq!(stack.push_copy(), Err(MatrixStackError::Overflow));
    }

    #[test]
    fn peek_after_pushes_and_pops_returns_matching_entry() {
        let mut s = MatrixStack::new();
        for i in 0..10 {
            s.push(t(i as f32)).unwrap();
        }
        for _ in 0..4 {
            s.pop().unwrap();
        }
        // 10 pushes, 4 pops: the sixth pushed matrix (index 5) is on top.
        assert_eq!(s.peek().unwrap(), t(5.0));
        assert_eq!(s.depth(), 6);
    }

    #[test]
    fn pop_returns_the_removed_entry() {
        let mut s = MatrixStack::new();
        s.push(t(1.0)).unwrap();
        s.push(t(2.0)).unwrap();
        assert_eq!(s.pop().unwrap(), t(2.0));
        assert_eq!(s.pop().unwrap(), t(1.0));
        assert_eq!(s.pop(), Err(MatrixStackError::Underflow));
    }

    #[test]
    fn scoped_translate_does_not_leak() {
        let mut s = MatrixStack::new();
        let base = Mat4::from_rotation_z(0.3) * t(7.5);
        s.push(base).unwrap();

        s.push_copy().unwrap();
        s.translate(Vec3::new(10.0, -4.0, 0.0)).unwrap();
        s.rotate(1.2, Vec3::Z).unwrap();
        assert_ne!(s.peek().unwrap(), base);
        s.pop().unwrap();

        assert_eq!(s.peek().unwrap().to_cols_array(), base.to_cols_array());
    }

    #[test]
    fn translate_post_multiplies_top() {
        let mut s = MatrixStack::new();
        s.push(Mat4::from_scale(Vec3::splat(2.0))).unwrap();
        s.translate(Vec3::new(1.0, 0.0, 0.0)).unwrap();
        // Scale applied after translation: the point moves by 2 units.
        let p = s.peek().unwrap().transform_point3(Vec3::ZERO);
        assert_eq!(p, Vec3::new(2.0, 0.0, 0.0));
    }

    #[test]
    fn push_copy_on_empty_stack_is_rejected() {
        let mut s = MatrixStack::new();
        assert_eq!(s.push_copy(), Err(MatrixStackError::Underflow));
        assert!(s.is_empty());
    }

    #[test]
    fn mutating_empty_stack_is_rejected() {
        let mut s = MatrixStack::new();
        assert_eq!(s.translate(Vec3::X), Err(MatrixStackError::Underflow));
        assert_eq!(s.rotate(1.0, Vec3::Z), Err(MatrixStackError::Underflow));
    }

    #[test]
    fn overflow_leaves_top_unchanged() {
        let mut s = MatrixStack::new();
        for i in 0..MATRIX_STACK_CAPACITY {
            s.push(t(i as f32)).unwrap();
        }
        let top = s.peek().unwrap();

        assert_eq!(s.push(t(-1.0)), Err(MatrixStackError::Overflow));
        assert_eq!(s.push_copy(), Err(MatrixStackError::Overflow));
        assert_eq!(s.peek().unwrap(), top);
        assert_eq!(s.depth(), MATRIX_STACK_CAPACITY);
    }

    #[test]
    fn rotate_about_zero_axis_is_ignored() {
        let mut s = MatrixStack::new();
        s.push(t(3.0)).unwrap();
        s.rotate(0.5, Vec3::ZERO).unwrap();
        assert_eq!(s.peek().unwrap(), t(3.0));
    }
}
