//! # MessageList Component
//!
//! Scrollable view of the transcript.
//!
//! ## Architecture
//!
//! `MessageList` is a transient component (created each frame) that wraps
//! `&'a mut MessageListState` (persistent state) and the transcript items
//! (props). Rendering mutates the state: it refreshes the layout cache,
//! clamps the scroll offset and follows the bottom while pinned.
//!
//! Placeholders can disappear from the middle of the transcript when replies
//! complete out of order, so cached heights are only reused for the prefix of
//! items that is unchanged since the last frame.

use ratatui::Frame;
use ratatui::layout::{Position, Rect, Size};
use tui_scrollview::{ScrollView, ScrollViewState, ScrollbarVisibility};

use crate::core::state::TranscriptItem;
use crate::tui::component::{Component, EventHandler};
use crate::tui::components::message::Message;
use crate::tui::event::TuiEvent;

/// Layout and scroll state for the message list.
/// Persisted across frames by the event loop.
pub struct MessageListState {
    pub scroll_state: ScrollViewState,
    pub layout: LayoutCache,
    /// When true, follow new content to the bottom
    pub stick_to_bottom: bool,
    /// Item under the mouse pointer
    pub hovered_index: Option<usize>,
    /// Last known viewport height (for scroll clamping between frames)
    pub viewport_height: u16,
}

impl Default for MessageListState {
    fn default() -> Self {
        Self::new()
    }
}

impl MessageListState {
    pub fn new() -> Self {
        Self {
            scroll_state: ScrollViewState::default(),
            layout: LayoutCache::new(),
            stick_to_bottom: true,
            hovered_index: None,
            viewport_height: 0,
        }
    }

    fn max_offset(&self) -> u16 {
        self.layout.total_height().saturating_sub(self.viewport_height)
    }

    /// Clamp scroll offset so it never exceeds the content bounds.
    pub fn clamp_scroll(&mut self) {
        let max_y = self.max_offset();
        let current = self.scroll_state.offset();
        if current.y > max_y {
            self.scroll_state.set_offset(Position {
                x: current.x,
                y: max_y,
            });
        }
    }

    /// Re-engage auto-scroll once the user has scrolled back to the end.
    pub fn repin_if_at_bottom(&mut self) {
        let max_y = self.max_offset();
        let current = self.scroll_state.offset();
        if current.y >= max_y {
            self.stick_to_bottom = true;
            self.scroll_state.set_offset(Position {
                x: current.x,
                y: max_y,
            });
        }
    }

    /// Jump to the newest entry and keep following it.
    pub fn scroll_to_bottom(&mut self) {
        self.stick_to_bottom = true;
        self.scroll_state.scroll_to_bottom();
    }

    /// True when content exists below the viewport the user can't see.
    pub fn has_unseen_content(&self) -> bool {
        !self.stick_to_bottom && self.scroll_state.offset().y < self.max_offset()
    }

    /// Index of the item drawn at `row` within the list's area, if any.
    pub fn item_at(&self, row: u16) -> Option<usize> {
        let offset = self.scroll_state.offset().y.min(self.max_offset());
        let content_y = offset.saturating_add(row);
        let idx = self
            .layout
            .prefix_heights
            .partition_point(|&end| end <= content_y);
        (idx < self.layout.prefix_heights.len()).then_some(idx)
    }
}

/// Scrollable transcript view.
/// Created fresh each frame with references to state and data.
pub struct MessageList<'a> {
    pub state: &'a mut MessageListState,
    pub items: &'a [TranscriptItem],
    pub spinner_frame: usize,
}

impl<'a> MessageList<'a> {
    pub fn new(
        state: &'a mut MessageListState,
        items: &'a [TranscriptItem],
        spinner_frame: usize,
    ) -> Self {
        Self {
            state,
            items,
            spinner_frame,
        }
    }
}

impl<'a> Component for MessageList<'a> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let content_width = area.width.saturating_sub(1); // -1 for the scrollbar
        self.state.layout.refresh(self.items, content_width);
        let total_height = self.state.layout.total_height();

        self.state.viewport_height = area.height;
        if !self.state.stick_to_bottom {
            self.state.clamp_scroll();
        }

        let scroll_offset = if self.state.stick_to_bottom {
            self.state.max_offset()
        } else {
            self.state.scroll_state.offset().y
        };
        let visible_range = self.state.layout.visible_range(scroll_offset, area.height);

        let mut scroll_view = ScrollView::new(Size::new(content_width, total_height))
            .vertical_scrollbar_visibility(ScrollbarVisibility::Always)
            .horizontal_scrollbar_visibility(ScrollbarVisibility::Never);

        let mut y_offset: u16 = if visible_range.start > 0 {
            self.state.layout.prefix_heights[visible_range.start - 1]
        } else {
            0
        };

        for i in visible_range {
            let height = self.state.layout.heights[i];
            let is_hovered = self.state.hovered_index == Some(i);
            let message = Message::new(&self.items[i], is_hovered, self.spinner_frame);
            scroll_view.render_widget(message, Rect::new(0, y_offset, content_width, height));
            y_offset += height;
        }

        if self.state.stick_to_bottom {
            self.state.scroll_state.scroll_to_bottom();
        }

        frame.render_stateful_widget(scroll_view, area, &mut self.state.scroll_state);
    }
}

/// Implemented on the state rather than `MessageList`: the list is rebuilt
/// every frame, while scroll position has to survive between frames.
impl EventHandler for MessageListState {
    type Event = ();

    fn handle_event(&mut self, event: &TuiEvent) -> Option<Self::Event> {
        match event {
            TuiEvent::ScrollUp => {
                self.scroll_state.scroll_up();
                self.stick_to_bottom = false;
            }
            TuiEvent::ScrollDown => {
                self.scroll_state.scroll_down();
                self.repin_if_at_bottom();
            }
            TuiEvent::ScrollPageUp => {
                self.scroll_state.scroll_page_up();
                self.stick_to_bottom = false;
            }
            TuiEvent::ScrollPageDown => {
                self.scroll_state.scroll_page_down();
                self.repin_if_at_bottom();
            }
            TuiEvent::ScrollToBottom => self.scroll_to_bottom(),
            _ => {}
        }
        None
    }
}

/// Cached bubble heights, keyed by the items they were measured for.
pub struct LayoutCache {
    pub heights: Vec<u16>,
    pub prefix_heights: Vec<u16>,
    measured: Vec<TranscriptItem>,
    content_width: u16,
}

impl Default for LayoutCache {
    fn default() -> Self {
        Self::new()
    }
}

impl LayoutCache {
    pub fn new() -> Self {
        Self {
            heights: Vec::new(),
            prefix_heights: Vec::new(),
            measured: Vec::new(),
            content_width: 0,
        }
    }

    /// Number of leading heights still valid for `items` at `content_width`.
    pub fn reusable_count(&self, items: &[TranscriptItem], content_width: u16) -> usize {
        if self.content_width != content_width {
            return 0;
        }
        self.measured
            .iter()
            .zip(items)
            .take_while(|(cached, current)| cached == current)
            .count()
    }

    /// Re-measures every item past the unchanged prefix.
    pub fn refresh(&mut self, items: &[TranscriptItem], content_width: u16) {
        let reusable = self.reusable_count(items, content_width);
        if reusable == items.len() && reusable == self.measured.len() {
            return;
        }

        self.heights.truncate(reusable);
        self.measured.truncate(reusable);
        for item in &items[reusable..] {
            self.heights.push(Message::calculate_height(item, content_width));
            self.measured.push(item.clone());
        }
        self.content_width = content_width;
        self.rebuild_prefix_heights();
    }

    pub fn total_height(&self) -> u16 {
        self.prefix_heights.last().copied().unwrap_or(0)
    }

    pub fn rebuild_prefix_heights(&mut self) {
        self.prefix_heights = self
            .heights
            .iter()
            .scan(0u16, |acc, &h| {
                *acc = acc.saturating_add(h);
                Some(*acc)
            })
            .collect();
    }

    pub fn visible_range(&self, scroll_offset: u16, viewport_height: u16) -> std::ops::Range<usize> {
        let buffer = viewport_height / 2;
        let buffered_start = scroll_offset.saturating_sub(buffer);
        let buffered_end = scroll_offset
            .saturating_add(viewport_height)
            .saturating_add(buffer);

        let start = self
            .prefix_heights
            .partition_point(|&end| end <= buffered_start);
        let end = self
            .prefix_heights
            .partition_point(|&end| end < buffered_end)
            .saturating_add(1)
            .min(self.prefix_heights.len());

        start..end
    }
}
