/// Bulk-edit interaction mode: either no tool, or exactly one active tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolMode<T> {
    Idle,
    Active(T),
}

impl<T> Default for ToolMode<T> {
    fn default() -> Self {
        Self::Idle
    }
}

impl<T: Copy + PartialEq> ToolMode<T> {
    /// Clicking the active tool toggles it off; any other tool replaces it.
    pub fn select(&mut self, tool: T) -> Self {
        *self = match *self {
            Self::Active(current) if current == tool => Self::Idle,
            _ => Self::Active(tool),
        };
        *self
    }

    pub fn clear(&mut self) {
        *self = Self::Idle;
    }

    pub fn active(&self) -> Option<T> {
        match self {
            Self::Active(tool) => Some(*tool),
            Self::Idle => None,
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Brush {
        Red,
        Blue,
    }

    #[test]
    fn starts_idle() {
        let mode: ToolMode<Brush> = ToolMode::default();
        assert!(mode.is_idle());
        assert_eq!(mode.active(), None);
    }

    #[test]
    fn selecting_the_active_tool_toggles_it_off() {
        let mut mode = ToolMode::default();
        assert_eq!(mode.select(Brush::Red), ToolMode::Active(Brush::Red));
        assert_eq!(mode.select(Brush::Red), ToolMode::Idle);
    }

    #[test]
    fn selecting_another_tool_replaces_it() {
        let mut mode = ToolMode::default();
        mode.select(Brush::Red);
        assert_eq!(mode.select(Brush::Blue), ToolMode::Active(Brush::Blue));
        assert_eq!(mode.active(), Some(Brush::Blue));

        mode.clear();
        assert!(mode.is_idle());
    }
}
