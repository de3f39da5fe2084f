//! 可见条目跟踪
//!
//! 列表滚动时只允许一个条目处于"激活"状态（用于控制播放）。

/// 滚动回调中上报的可见条目
#[derive(Debug, Clone, PartialEq)]
pub struct ViewableItem {
    /// 在列表中的位置
    pub index: usize,
    pub id: String,
    /// 可见比例，0.0 ~ 1.0
    pub visible_fraction: f32,
}

#[derive(Debug, Clone)]
pub struct VisibilityTracker {
    threshold: f32,
    active: Option<(usize, String)>,
    focused: bool,
}

impl VisibilityTracker {
    /// `threshold` 为判定可见的最小比例，越界时截断到 [0, 1]
    pub fn new(threshold: f32) -> Self {
        Self {
            threshold: threshold.clamp(0.0, 1.0),
            active: None,
            focused: true,
        }
    }

    /// 当前激活条目的位置
    pub fn active_index(&self) -> Option<usize> {
        self.active.as_ref().map(|(i, _)| *i)
    }

    /// 当前激活条目的 id
    pub fn active_id(&self) -> Option<&str> {
        self.active.as_ref().map(|(_, id)| id.as_str())
    }

    pub fn is_active(&self, index: usize) -> bool {
        self.active_index() == Some(index)
    }

    /// 处理可见条目变化：达到阈值的条目中位置最靠前的成为激活条目。
    /// 没有条目达到阈值时保持原状态。返回激活条目是否发生变化。
    pub fn on_viewable_items_changed(&mut self, items: &[ViewableItem]) -> bool {
        let first = items
            .iter()
            .filter(|item| item.visible_fraction >= self.threshold)
            .min_by_key(|item| item.index);
        match first {
            Some(item) => {
                let next = (item.index, item.id.clone());
                let changed = self.active.as_ref() != Some(&next);
                self.active = Some(next);
                changed
            }
            None => false,
        }
    }

    /// 整页吸附滚动：按偏移量计算当前页，`ids` 为列表中各条目的 id
    pub fn on_scroll_offset(&mut self, offset: f32, page_height: f32, ids: &[String]) -> bool {
        if ids.is_empty() || page_height <= 0.0 {
            return false;
        }
        let page = (offset.max(0.0) / page_height).round() as usize;
        let index = page.min(ids.len() - 1);
        let next = (index, ids[index].clone());
        let changed = self.active.as_ref() != Some(&next);
        self.active = Some(next);
        changed
    }

    /// 页面切到后台或回到前台
    pub fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }

    /// 只有激活条目且页面处于前台时才播放
    pub fn should_play(&self, index: usize) -> bool {
        self.focused && self.is_active(index)
    }

    /// 列表刷新后清空激活状态
    pub fn reset(&mut self) {
        self.active = None;
    }
}

impl Default for VisibilityTracker {
    fn default() -> Self {
        Self::new(0.5)
    }
}
