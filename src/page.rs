//! The portfolio page itself.
//!
//! Lays out the hero, about, projects, skills and contact sections with
//! egui and routes input into the effect state machines. Every effect keeps
//! its own clock; [`PortfolioPage::advance`] moves them all forward once per
//! frame before [`PortfolioPage::ui`] draws them.

use std::time::Duration;

use egui::{pos2, vec2, Align2, Color32, FontId, Pos2, Rect, Sense, Stroke};
use glam::Vec2;
use log::{debug, info};
use rand::rngs::StdRng;

use crate::floating::{FloatingShape, Outline};
use crate::form::{ButtonState, ContactForm, FieldKind, NotificationKind, Transport};
use crate::mobile::{
    DeviceProfile, MobileMenu, PerformanceMode, ResizeDebounce, SwipeTracker,
    TouchFeedback, ViewportMetrics,
};
use crate::pointer::{self, AmbientLight, Bounds, Ripples};
use crate::scroll::{self, Navbar, RevealObserver, RootMargin, Span, StaggeredReveal};
use crate::text::{CounterAnimation, GlitchText, Typewriter, WordReveal};
use crate::theme::{ColorScheme, Palette};

const NAV_HEIGHT: f32 = 64.0;
const MAX_CONTENT_WIDTH: f32 = 1100.0;
const SECTION_PADDING: f32 = 96.0;
const HEADING_HEIGHT: f32 = 72.0;
const NAV_PADDING_TOP: f32 = 16.0;
const SIDE_PADDING: f32 = 32.0;
const FOOTER_PADDING: f32 = 32.0;

const NAME: &str = "Jordan Ellis";
const TAGLINE: &str = "Building fast, reliable software for the web";
const ABOUT: &str = "I'm a developer who enjoys turning rough ideas into polished products. \
    Over the years I've shipped storefronts, dashboards and realtime tools, \
    and I care as much about how an interface feels as about the code behind it.";
const STATS: [(u64, &str); 3] = [
    (50, "Projects Completed"),
    (5, "Years Experience"),
    (30, "Happy Clients"),
];
const PROJECTS: [(&str, &str); 3] = [
    (
        "Storefront",
        "A headless commerce frontend with instant search and a checkout that works offline.",
    ),
    (
        "Pulse Dashboard",
        "Live metrics for a fleet of services, streamed and charted without page reloads.",
    ),
    (
        "Sketchpad",
        "A collaborative whiteboard with presence, undo history and vector export.",
    ),
];
const SKILLS: [&str; 10] = [
    "Rust",
    "TypeScript",
    "React",
    "Node.js",
    "PostgreSQL",
    "GraphQL",
    "Docker",
    "WebGL",
    "Figma",
    "CI/CD",
];
const SHAPE_ANCHORS: [[f32; 2]; 4] = [[0.08, 0.18], [0.82, 0.12], [0.7, 0.62], [0.14, 0.74]];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Section {
    Home,
    About,
    Projects,
    Skills,
    Contact,
}

impl Section {
    const ALL: [Section; 5] = [
        Section::Home,
        Section::About,
        Section::Projects,
        Section::Skills,
        Section::Contact,
    ];

    fn label(self) -> &'static str {
        match self {
            Section::Home => "Home",
            Section::About => "About",
            Section::Projects => "Projects",
            Section::Skills => "Skills",
            Section::Contact => "Contact",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
enum Button {
    ViewWork,
    GetInTouch,
    Submit,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
enum TouchTarget {
    Button(Button),
    Project(usize),
    Skill(usize),
}

pub struct PortfolioPage {
    scheme: ColorScheme,
    visuals_dirty: bool,

    size: Vec2,
    cores: usize,
    profile: DeviceProfile,
    performance: PerformanceMode,
    metrics: ViewportMetrics,
    resize: ResizeDebounce,
    menu: MobileMenu,
    swipe: SwipeTracker,
    touch: TouchFeedback<TouchTarget>,
    touching: Option<TouchTarget>,
    touch_targets: Vec<(TouchTarget, Rect)>,
    nav_rect: Option<Rect>,

    navbar: Navbar,
    sections: RevealObserver<Section>,
    section_spans: Vec<(Section, Span)>,
    stats_observer: RevealObserver<()>,
    scroll_y: f32,
    progress: f32,
    active: Option<Section>,
    scroll_to: Option<Section>,

    typewriter: Typewriter,
    glitch: GlitchText,
    name_hovered: bool,
    about: WordReveal,
    counters: Vec<CounterAnimation>,
    projects: StaggeredReveal,
    skills: StaggeredReveal,
    shapes: Vec<FloatingShape>,
    ripples: [Ripples; 3],
    light: AmbientLight,
    form: ContactForm,
    rng: StdRng,
}

impl PortfolioPage {
    pub fn new(
        size: Vec2,
        scheme: ColorScheme,
        cores: usize,
        rng: StdRng,
        transport: Box<dyn Transport>,
    ) -> Self {
        let profile = DeviceProfile::detect(std::env::consts::OS, size.x, false);
        let performance = PerformanceMode::detect(profile, cores);
        info!(
            "Page at {}x{} on {} cores: {:?}, {:?}",
            size.x, size.y, cores, profile, performance
        );

        let mut shapes: Vec<FloatingShape> = (0..SHAPE_ANCHORS.len())
            .map(FloatingShape::new)
            .collect();
        if performance == PerformanceMode::Reduced {
            shapes.iter_mut().for_each(FloatingShape::freeze);
        }

        Self {
            scheme,
            visuals_dirty: true,

            size,
            cores,
            profile,
            performance,
            metrics: ViewportMetrics::new(size),
            resize: ResizeDebounce::default(),
            menu: MobileMenu::default(),
            swipe: SwipeTracker::default(),
            touch: TouchFeedback::default(),
            touching: None,
            touch_targets: Vec::new(),
            nav_rect: None,

            navbar: Navbar::default(),
            sections: RevealObserver::new(
                0.1,
                RootMargin {
                    top: 0.0,
                    bottom: 50.0,
                },
            ),
            section_spans: Vec::new(),
            stats_observer: RevealObserver::new(0.0, RootMargin::default()),
            scroll_y: 0.0,
            progress: 0.0,
            active: None,
            scroll_to: None,

            typewriter: Typewriter::new(TAGLINE),
            glitch: GlitchText::new(NAME),
            name_hovered: false,
            about: WordReveal::new(ABOUT),
            counters: STATS
                .iter()
                .map(|(target, _)| {
                    CounterAnimation::new(*target, CounterAnimation::DEFAULT_DURATION)
                })
                .collect(),
            projects: StaggeredReveal::new(PROJECTS.len()),
            skills: StaggeredReveal::new(SKILLS.len()),
            shapes,
            ripples: [Ripples::new(), Ripples::new(), Ripples::new()],
            light: AmbientLight::default(),
            form: ContactForm::new(transport),
            rng,
        }
    }

    pub fn scheme(&self) -> ColorScheme {
        self.scheme
    }

    pub fn set_scheme(&mut self, scheme: ColorScheme) {
        if scheme != self.scheme {
            info!(
                "Switching to the {:?} colour scheme ({})",
                scheme,
                scheme.theme_color()
            );
            self.scheme = scheme;
            self.visuals_dirty = true;
        }
    }

    pub fn advance(&mut self, dt: Duration) {
        self.typewriter.advance(dt);
        self.glitch.advance(dt, &mut self.rng);
        self.about.advance(dt);
        for counter in &mut self.counters {
            counter.advance(dt);
        }
        self.projects.advance(dt);
        self.skills.advance(dt);
        for shape in &mut self.shapes {
            shape.advance(dt);
        }
        for ripples in &mut self.ripples {
            ripples.advance(dt);
        }
        self.form.advance(dt);
        self.touch.advance(dt);

        if let Some(size) = self.resize.advance(dt) {
            self.apply_size(size);
        }
    }

    /// Something is mid-animation and wants the next frame soon.
    pub fn is_animating(&self) -> bool {
        self.typewriter.is_animating()
            || self.glitch.is_animating()
            || self.about.is_animating()
            || self.counters.iter().any(CounterAnimation::is_animating)
            || self.projects.is_animating()
            || self.skills.is_animating()
            || self.ripples.iter().any(Ripples::is_animating)
            || self.form.is_animating()
            || self.touch.is_animating()
            || self.resize.is_animating()
    }

    /// Slow background motion that only needs an occasional frame.
    pub fn wants_tick(&self) -> bool {
        self.shapes.iter().any(|shape| !shape.is_frozen())
    }

    pub fn on_resize(&mut self, size: Vec2) {
        self.resize.resized(size);
    }

    pub fn on_escape(&mut self) {
        self.menu.close();
    }

    pub fn pointer_moved(&mut self, position: Vec2) {
        self.light.pointer_moved(position);
    }

    pub fn pointer_left(&mut self) {
        self.light.pointer_left();
    }

    pub fn touch_start(&mut self, position: Vec2) {
        if !self.profile.touch {
            self.profile.touch = true;
            debug!("Touch input detected");
        }

        self.swipe.touch_start(position.y);
        let at = pos2(position.x, position.y);
        self.touching = self
            .touch_targets
            .iter()
            .find(|(_, rect)| rect.contains(at))
            .map(|(target, _)| *target);
        if let Some(target) = self.touching {
            self.touch.touch_start(target);
        }
    }

    pub fn touch_end(&mut self, position: Vec2) {
        if self.swipe.touch_end(position.y) && self.menu.is_open() {
            debug!("Swipe closed the menu");
            self.menu.close();
        }
        if let Some(target) = self.touching.take() {
            self.touch.touch_end(target);
        }
    }

    fn apply_size(&mut self, size: Vec2) {
        let rotated = (self.size.x > self.size.y) != (size.x > size.y);
        self.size = size;
        self.profile = DeviceProfile::detect(std::env::consts::OS, size.x, self.profile.touch);
        self.metrics = ViewportMetrics::new(size);

        if rotated || self.profile.is_desktop() {
            self.menu.close();
        }

        let performance = PerformanceMode::detect(self.profile, self.cores);
        if performance != self.performance {
            info!("Performance mode is now {:?}", performance);
            if performance == PerformanceMode::Reduced {
                self.shapes.iter_mut().for_each(FloatingShape::freeze);
            }
            self.performance = performance;
        }
    }

    fn go_to(&mut self, section: Section) {
        self.scroll_to = Some(section);
        self.menu.close();
    }

    fn span_of(&self, section: Section) -> Option<Span> {
        self.section_spans
            .iter()
            .find(|(key, _)| *key == section)
            .map(|(_, span)| *span)
    }

    fn on_scroll(&mut self, scroll_y: f32, content_height: f32, viewport_height: f32) {
        if scroll_y != self.scroll_y {
            self.navbar.on_scroll(scroll_y);
            self.scroll_y = scroll_y;
        }
        self.progress = scroll::scroll_progress(scroll_y, content_height, viewport_height);
        self.active = scroll::active_section(&self.section_spans, scroll_y);

        let viewport = Span::new(scroll_y, viewport_height);
        for section in self.sections.update(viewport) {
            debug!("Revealed {:?}", section);
            match section {
                Section::About => self.about.reveal(),
                Section::Projects => self.projects.start(),
                Section::Skills => self.skills.start(),
                Section::Home | Section::Contact => (),
            }
        }
        if !self.stats_observer.update(viewport).is_empty() {
            self.counters.iter_mut().for_each(CounterAnimation::start);
        }
    }

    pub fn ui(&mut self, ctx: &egui::Context) {
        if self.visuals_dirty {
            ctx.set_visuals(self.scheme.visuals());
            self.visuals_dirty = false;
        }
        let palette = self.scheme.palette();

        let clicked_at = ctx.input(|i| {
            if i.pointer.any_click() {
                i.pointer.interact_pos()
            } else {
                None
            }
        });
        if let Some(at) = clicked_at {
            let inside_nav = self.nav_rect.is_some_and(|rect| rect.contains(at));
            self.menu.clicked(inside_nav);
        }

        self.touch_targets.clear();

        egui::CentralPanel::default()
            .frame(egui::Frame::none().fill(palette.background))
            .show(ctx, |ui| {
                self.paint_shapes(ui.painter(), ui.max_rect(), &palette);

                let mut area = egui::ScrollArea::vertical().auto_shrink([false, false]);
                let target = self.scroll_to.take().and_then(|s| self.span_of(s));
                if let Some(span) = target {
                    area = area.vertical_scroll_offset((span.top - NAV_HEIGHT).max(0.0));
                }

                let output = area.show(ui, |ui| self.content(ui, &palette));
                self.on_scroll(
                    output.state.offset.y,
                    output.content_size.y,
                    output.inner_rect.height(),
                );
            });

        self.navbar(ctx, &palette);
        self.notifications(ctx, &palette);
        self.overlay(ctx, &palette);
    }

    fn paint_shapes(&self, painter: &egui::Painter, rect: Rect, palette: &Palette) {
        let profile = self.profile.parallax();
        for (index, shape) in self.shapes.iter().enumerate() {
            let [ax, ay] = SHAPE_ANCHORS[index];
            let size = 80.0 + 20.0 * index as f32;
            let min = pos2(
                rect.left() + rect.width() * ax,
                rect.top() + rect.height() * ay + shape.offset(self.scroll_y, profile),
            );
            let color = if index % 2 == 0 {
                palette.primary
            } else {
                palette.secondary
            }
            .gamma_multiply(0.12);

            match shape.outline() {
                Outline::Circle => {
                    painter.circle_filled(min + vec2(size, size) / 2.0, size / 2.0, color);
                }
                outline => {
                    let points = outline
                        .points()
                        .iter()
                        .map(|[x, y]| min + vec2(x * size, y * size))
                        .collect();
                    painter.add(egui::Shape::convex_polygon(points, color, Stroke::NONE));
                }
            }
        }
    }

    fn content(&mut self, ui: &mut egui::Ui, palette: &Palette) {
        ui.spacing_mut().item_spacing = egui::Vec2::ZERO;

        let origin = ui.max_rect().top();
        let width = ui.available_width();
        let column = (width - 2.0 * SIDE_PADDING).clamp(0.0, MAX_CONTENT_WIDTH);
        let left = ui.max_rect().left() + (width - column) / 2.0;

        self.section_spans.clear();
        let hero = self.hero(ui, palette);
        self.record(Section::Home, hero, origin);
        let about = self.about(ui, left, column, origin, palette);
        self.record(Section::About, about, origin);
        let projects = self.projects(ui, left, column, palette);
        self.record(Section::Projects, projects, origin);
        let skills = self.skills(ui, left, column, palette);
        self.record(Section::Skills, skills, origin);
        let contact = self.contact(ui, left, column, palette);
        self.record(Section::Contact, contact, origin);

        let footer = FOOTER_PADDING * 2.0 + 20.0;
        let (rect, _) = ui.allocate_exact_size(vec2(width, footer), Sense::hover());
        ui.painter().text(
            rect.center(),
            Align2::CENTER_CENTER,
            format!("© 2026 {NAME}"),
            FontId::proportional(14.0),
            palette.muted,
        );
    }

    fn record(&mut self, section: Section, rect: Rect, origin: f32) {
        let span = Span::new(rect.top() - origin, rect.height());
        self.sections.observe(section, span);
        self.section_spans.push((section, span));
    }

    fn hero(&mut self, ui: &mut egui::Ui, palette: &Palette) -> Rect {
        let width = ui.available_width();
        let height = self.metrics.hero_min_height().max(420.0);
        let (rect, _) = ui.allocate_exact_size(vec2(width, height), Sense::hover());
        let center = rect.center();

        let name = ui.painter().text(
            center - vec2(0.0, 60.0),
            Align2::CENTER_CENTER,
            self.glitch.text(),
            FontId::monospace(if self.profile.mobile { 36.0 } else { 56.0 }),
            palette.text,
        );
        let hovered = ui
            .interact(name, ui.id().with("hero-name"), Sense::hover())
            .hovered();
        if hovered && !self.name_hovered {
            self.glitch.hover();
        }
        self.name_hovered = hovered;

        let mut tagline = self.typewriter.visible_text().to_owned();
        if self.typewriter.cursor_visible() {
            tagline.push('|');
        }
        ui.painter().text(
            center,
            Align2::CENTER_CENTER,
            tagline,
            FontId::proportional(22.0),
            palette.muted,
        );

        let size = vec2(160.0, 48.0);
        let work = Rect::from_min_size(center + vec2(-size.x - 8.0, 60.0), size);
        let contact = Rect::from_min_size(center + vec2(8.0, 60.0), size);
        if self.button(
            ui,
            Button::ViewWork,
            work,
            "View My Work",
            palette.primary,
            Color32::WHITE,
            true,
        ) {
            self.go_to(Section::Projects);
        }
        if self.button(
            ui,
            Button::GetInTouch,
            contact,
            "Get In Touch",
            palette.surface,
            palette.text,
            true,
        ) {
            self.go_to(Section::Contact);
        }

        rect
    }

    fn about(
        &mut self,
        ui: &mut egui::Ui,
        left: f32,
        column: f32,
        origin: f32,
        palette: &Palette,
    ) -> Rect {
        let font = FontId::proportional(20.0);
        let (offsets, text_height) = flow_words(ui, self.about.words(), &font, column);
        let stats_height = 110.0;
        let height = SECTION_PADDING * 2.0 + HEADING_HEIGHT + text_height + 48.0 + stats_height;

        let width = ui.available_width();
        let (rect, _) = ui.allocate_exact_size(vec2(width, height), Sense::hover());
        let painter = ui.painter();
        section_heading(painter, rect, "About Me", palette);

        let text_top = rect.top() + SECTION_PADDING + HEADING_HEIGHT;
        for (index, (word, offset)) in self.about.words().iter().zip(&offsets).enumerate() {
            let progress = self.about.progress(index);
            let rise = WordReveal::RISE * (1.0 - progress);
            painter.text(
                pos2(left, text_top) + *offset + vec2(0.0, rise),
                Align2::LEFT_TOP,
                word,
                font.clone(),
                palette.muted.gamma_multiply(progress),
            );
        }

        let stats_top = text_top + text_height + 48.0;
        self.stats_observer
            .observe((), Span::new(stats_top - origin, stats_height));
        let cell = column / self.counters.len() as f32;
        for (index, (counter, (_, label))) in self.counters.iter().zip(STATS).enumerate() {
            let x = left + cell * (index as f32 + 0.5);
            painter.text(
                pos2(x, stats_top),
                Align2::CENTER_TOP,
                format!(
                    "{}{}",
                    counter.value(),
                    if counter.is_finished() { "+" } else { "" }
                ),
                FontId::proportional(44.0),
                palette.primary,
            );
            painter.text(
                pos2(x, stats_top + 60.0),
                Align2::CENTER_TOP,
                label,
                FontId::proportional(15.0),
                palette.muted,
            );
        }

        rect
    }

    fn projects(&mut self, ui: &mut egui::Ui, left: f32, column: f32, palette: &Palette) -> Rect {
        let columns: usize = if self.profile.mobile {
            1
        } else if column < 900.0 {
            2
        } else {
            3
        };
        let gap = 24.0;
        let card_size = vec2(
            (column - gap * (columns - 1) as f32) / columns as f32,
            220.0,
        );
        let rows = PROJECTS.len().div_ceil(columns);
        let height = SECTION_PADDING * 2.0
            + HEADING_HEIGHT
            + rows as f32 * card_size.y
            + (rows - 1) as f32 * gap;

        let width = ui.available_width();
        let (rect, _) = ui.allocate_exact_size(vec2(width, height), Sense::hover());
        section_heading(ui.painter(), rect, "Featured Projects", palette);

        let grid_top = rect.top() + SECTION_PADDING + HEADING_HEIGHT;
        let description_font = FontId::proportional(15.0);
        for (index, (title, description)) in PROJECTS.iter().enumerate() {
            let (row, col) = (index / columns, index % columns);
            let card = Rect::from_min_size(
                pos2(
                    left + col as f32 * (card_size.x + gap),
                    grid_top + row as f32 * (card_size.y + gap),
                ),
                card_size,
            );
            let target = TouchTarget::Project(index);
            self.touch_targets.push((target, card));

            if !self.projects.is_revealed(index) {
                continue;
            }

            let response = ui.interact(card, ui.id().with(("project", index)), Sense::hover());
            let tilt = pointer::tilt(response.hover_pos().map(to_glam), bounds(card));
            let glow = pointer::glow(response.hovered());
            let scale = glow.scale * self.touch.scale(target);
            let shift = vec2(-tilt.rotate_y, tilt.rotate_x) * 0.5 - vec2(0.0, tilt.lift * 0.25);
            let drawn = Rect::from_center_size(card.center() + shift, card.size() * scale);

            let painter = ui.painter();
            if tilt.lift > 0.0 {
                painter.rect_filled(
                    drawn.translate(vec2(0.0, tilt.lift * 0.5)),
                    12.0,
                    Color32::from_black_alpha(40),
                );
            }
            if glow.alpha > 0.0 {
                painter.rect_stroke(
                    drawn.expand(3.0),
                    14.0,
                    Stroke::new(2.0, palette.primary.gamma_multiply(glow.alpha)),
                );
            }
            painter.rect_filled(drawn, 12.0, palette.surface);
            if self.touch.is_active(target) {
                painter.rect_stroke(drawn, 12.0, Stroke::new(1.0, palette.primary));
            }

            painter.text(
                drawn.min + vec2(20.0, 20.0),
                Align2::LEFT_TOP,
                title,
                FontId::proportional(22.0),
                palette.text,
            );
            let words: Vec<&str> = description.split(' ').collect();
            let (offsets, _) = flow_words(ui, &words, &description_font, drawn.width() - 40.0);
            for (word, offset) in words.iter().zip(offsets) {
                painter.text(
                    drawn.min + vec2(20.0, 64.0) + offset,
                    Align2::LEFT_TOP,
                    word,
                    description_font.clone(),
                    palette.muted,
                );
            }
        }

        rect
    }

    fn skills(&mut self, ui: &mut egui::Ui, left: f32, column: f32, palette: &Palette) -> Rect {
        let font = FontId::proportional(16.0);
        let sizes: Vec<egui::Vec2> = SKILLS
            .iter()
            .map(|skill| text_size(ui, skill, &font) + vec2(32.0, 20.0))
            .collect();
        let (offsets, tags_height) = flow_boxes(&sizes, column, 12.0);
        let height = SECTION_PADDING * 2.0 + HEADING_HEIGHT + tags_height;

        let width = ui.available_width();
        let (rect, _) = ui.allocate_exact_size(vec2(width, height), Sense::hover());
        section_heading(ui.painter(), rect, "Skills", palette);

        let top = rect.top() + SECTION_PADDING + HEADING_HEIGHT;
        for (index, skill) in SKILLS.iter().enumerate() {
            let tag = Rect::from_min_size(pos2(left, top) + offsets[index], sizes[index]);
            let target = TouchTarget::Skill(index);
            self.touch_targets.push((target, tag));

            if !self.skills.is_revealed(index) {
                continue;
            }

            let response = ui.interact(tag, ui.id().with(("skill", index)), Sense::hover());
            let lift = pointer::hover_lift(response.hovered());
            let scale = lift.scale * self.touch.scale(target);
            let drawn =
                Rect::from_center_size(tag.center() - vec2(0.0, lift.rise), tag.size() * scale);
            let (fill, text) = if response.hovered() || self.touch.is_active(target) {
                (palette.primary, Color32::WHITE)
            } else {
                (palette.surface, palette.text)
            };

            let painter = ui.painter();
            painter.rect_filled(drawn, drawn.height() / 2.0, fill);
            painter.text(drawn.center(), Align2::CENTER_CENTER, skill, font.clone(), text);
        }

        rect
    }

    fn contact(&mut self, ui: &mut egui::Ui, left: f32, column: f32, palette: &Palette) -> Rect {
        const LABEL: f32 = 22.0;
        const ERROR: f32 = 22.0;
        const GAP: f32 = 12.0;
        const BUTTON: f32 = 48.0;

        let fields: Vec<(&'static str, &'static str, FieldKind)> = self
            .form
            .fields()
            .iter()
            .map(|field| (field.name, field.label, field.kind))
            .collect();
        let fields_height: f32 = fields
            .iter()
            .map(|(_, _, kind)| LABEL + input_height(*kind) + ERROR + GAP)
            .sum();
        let height = SECTION_PADDING * 2.0 + HEADING_HEIGHT + fields_height + BUTTON;

        let width = ui.available_width();
        let (rect, _) = ui.allocate_exact_size(vec2(width, height), Sense::hover());
        section_heading(ui.painter(), rect, "Get In Touch", palette);

        let form_width = column.min(600.0);
        let form_left = left + (column - form_width) / 2.0;
        let mut y = rect.top() + SECTION_PADDING + HEADING_HEIGHT;
        for (name, label, kind) in fields {
            ui.painter().text(
                pos2(form_left, y),
                Align2::LEFT_TOP,
                label,
                FontId::proportional(14.0),
                palette.muted,
            );
            let input = Rect::from_min_size(
                pos2(form_left, y + LABEL),
                vec2(form_width, input_height(kind)),
            );
            y = input.bottom() + ERROR + GAP;

            let Some(field) = self.form.field_mut(name) else {
                continue;
            };
            let mut value = field.value().to_owned();
            let editor = if kind == FieldKind::Message {
                egui::TextEdit::multiline(&mut value).desired_rows(5)
            } else {
                egui::TextEdit::singleline(&mut value)
            };
            let response = ui.put(input, editor.id_source(name).desired_width(form_width));
            if response.changed() {
                field.input(value);
            }
            if response.lost_focus() {
                field.blur();
            }

            if let Some(error) = field.error() {
                ui.painter().text(
                    pos2(form_left, input.bottom() + 4.0),
                    Align2::LEFT_TOP,
                    error.to_string(),
                    FontId::proportional(13.0),
                    palette.error,
                );
            }
        }

        let state = self.form.button();
        let fill = match state {
            ButtonState::Idle => palette.primary,
            ButtonState::Sending => palette.muted,
            ButtonState::Sent => palette.success,
            ButtonState::Failed => palette.error,
        };
        let submit = Rect::from_min_size(pos2(form_left, y), vec2(form_width, BUTTON));
        if self.button(
            ui,
            Button::Submit,
            submit,
            state.label(),
            fill,
            Color32::WHITE,
            state.is_enabled(),
        ) {
            if let Err(err) = self.form.submit() {
                debug!("Submit rejected: {err}");
            }
        }

        rect
    }

    /// A magnetic button with click ripples. Returns whether it was clicked.
    #[allow(clippy::too_many_arguments)]
    fn button(
        &mut self,
        ui: &egui::Ui,
        button: Button,
        rect: Rect,
        label: &str,
        fill: Color32,
        text: Color32,
        enabled: bool,
    ) -> bool {
        let target = TouchTarget::Button(button);
        self.touch_targets.push((target, rect));

        let sense = if enabled { Sense::click() } else { Sense::hover() };
        let response = ui.interact(rect, ui.id().with(button), sense);
        let offset = pointer::magnetic_offset(response.hover_pos().map(to_glam), bounds(rect));
        let drawn = Rect::from_center_size(
            rect.center() + vec2(offset.x, offset.y),
            rect.size() * self.touch.scale(target),
        );

        let ripples = &mut self.ripples[button as usize];
        let clicked = response.clicked();
        if clicked {
            if let Some(at) = response.interact_pointer_pos() {
                ripples.spawn(to_glam(at), bounds(drawn));
            }
        }

        let painter = ui.painter().with_clip_rect(drawn);
        painter.rect_filled(drawn, 8.0, fill);
        for ripple in ripples.active() {
            painter.circle_filled(
                drawn.min + vec2(ripple.center.x, ripple.center.y),
                ripples.radius(ripple),
                Color32::WHITE.gamma_multiply(ripples.opacity(ripple)),
            );
        }
        painter.text(
            drawn.center(),
            Align2::CENTER_CENTER,
            label,
            FontId::proportional(16.0),
            text,
        );

        clicked
    }

    fn navbar(&mut self, ctx: &egui::Context, palette: &Palette) {
        let screen = ctx.screen_rect();
        let links = if self.profile.mobile && self.menu.is_open() {
            Section::ALL.len() as f32 * 44.0
        } else {
            0.0
        };
        let height = NAV_HEIGHT + NAV_PADDING_TOP + links;
        let y = if self.navbar.hidden && !self.menu.is_open() {
            -height
        } else {
            0.0
        };
        let fill = if self.navbar.solid {
            palette.surface
        } else {
            palette.background.gamma_multiply(0.7)
        };

        let area = egui::Area::new(egui::Id::new("navbar"))
            .fixed_pos(pos2(0.0, y))
            .order(egui::Order::Foreground)
            .show(ctx, |ui| {
                let (rect, _) =
                    ui.allocate_exact_size(vec2(screen.width(), height), Sense::hover());
                ui.painter().rect_filled(rect, 0.0, fill);

                let bar = Rect::from_min_size(
                    rect.min + vec2(SIDE_PADDING, NAV_PADDING_TOP),
                    vec2(screen.width() - 2.0 * SIDE_PADDING, NAV_HEIGHT),
                );
                ui.painter().text(
                    bar.left_center(),
                    Align2::LEFT_CENTER,
                    "JE",
                    FontId::proportional(24.0),
                    palette.primary,
                );

                if self.profile.mobile {
                    self.menu_toggle(ui, bar, palette);
                    if self.menu.is_open() {
                        for (index, section) in Section::ALL.into_iter().enumerate() {
                            let link = Rect::from_min_size(
                                pos2(bar.left(), bar.bottom() + index as f32 * 44.0),
                                vec2(bar.width(), 44.0),
                            );
                            if self.nav_link(ui, link, section, false, palette) {
                                self.go_to(section);
                            }
                        }
                    }
                } else {
                    let font = FontId::proportional(16.0);
                    let mut right = bar.right();
                    for section in Section::ALL.into_iter().rev() {
                        let width = text_size(ui, section.label(), &font).x + 24.0;
                        let link = Rect::from_min_size(
                            pos2(right - width, bar.top()),
                            vec2(width, bar.height()),
                        );
                        right -= width;
                        if self.nav_link(ui, link, section, true, palette) {
                            self.go_to(section);
                        }
                    }
                }
            });
        self.nav_rect = Some(area.response.rect);
    }

    fn menu_toggle(&mut self, ui: &egui::Ui, bar: Rect, palette: &Palette) {
        let toggle = Rect::from_center_size(bar.right_center() - vec2(20.0, 0.0), vec2(40.0, 40.0));
        if ui
            .interact(toggle, ui.id().with("menu-toggle"), Sense::click())
            .clicked()
        {
            self.menu.toggle();
        }

        let stroke = Stroke::new(2.0, palette.text);
        let c = toggle.center();
        if self.menu.is_open() {
            ui.painter().line_segment([c + vec2(-9.0, -9.0), c + vec2(9.0, 9.0)], stroke);
            ui.painter().line_segment([c + vec2(-9.0, 9.0), c + vec2(9.0, -9.0)], stroke);
        } else {
            for dy in [-7.0, 0.0, 7.0] {
                ui.painter().line_segment([c + vec2(-11.0, dy), c + vec2(11.0, dy)], stroke);
            }
        }
    }

    fn nav_link(
        &self,
        ui: &egui::Ui,
        rect: Rect,
        section: Section,
        centered: bool,
        palette: &Palette,
    ) -> bool {
        let response = ui.interact(rect, ui.id().with(("nav", section)), Sense::click());
        let color = if self.active == Some(section) || response.hovered() {
            palette.primary
        } else {
            palette.text
        };
        let (anchor, align) = if centered {
            (rect.center(), Align2::CENTER_CENTER)
        } else {
            (rect.left_center(), Align2::LEFT_CENTER)
        };
        ui.painter().text(
            anchor,
            align,
            section.label(),
            FontId::proportional(16.0),
            color,
        );
        response.clicked()
    }

    fn notifications(&self, ctx: &egui::Context, palette: &Palette) {
        let items = self.form.notifications().items();
        if items.is_empty() {
            return;
        }

        egui::Area::new(egui::Id::new("notifications"))
            .anchor(Align2::RIGHT_TOP, vec2(-20.0, NAV_HEIGHT + 16.0))
            .order(egui::Order::Tooltip)
            .interactable(false)
            .show(ctx, |ui| {
                for notification in items {
                    let color = match notification.kind {
                        NotificationKind::Success => palette.success,
                        NotificationKind::Error => palette.error,
                    };
                    let (rect, _) = ui.allocate_exact_size(vec2(320.0, 56.0), Sense::hover());
                    let (rect, alpha) = if notification.leaving {
                        (rect.translate(vec2(rect.width() / 2.0, 0.0)), 0.4)
                    } else {
                        (rect, 1.0)
                    };

                    ui.painter()
                        .rect_filled(rect, 8.0, color.gamma_multiply(alpha));
                    ui.painter().text(
                        rect.left_center() + vec2(16.0, 0.0),
                        Align2::LEFT_CENTER,
                        &notification.message,
                        FontId::proportional(15.0),
                        Color32::WHITE.gamma_multiply(alpha),
                    );
                    ui.add_space(8.0);
                }
            });
    }

    fn overlay(&self, ctx: &egui::Context, palette: &Palette) {
        let painter = ctx.layer_painter(egui::LayerId::new(
            egui::Order::Tooltip,
            egui::Id::new("overlay"),
        ));
        let screen = ctx.screen_rect();

        let progress = screen.width() * self.progress / 100.0;
        painter.rect_filled(
            Rect::from_min_size(screen.min, vec2(progress, 3.0)),
            0.0,
            palette.primary,
        );

        if let Some(center) = self.light.center() {
            let center = pos2(center.x, center.y);
            let radius = AmbientLight::DIAMETER / 2.0;
            for ring in 1..=4 {
                painter.circle_filled(
                    center,
                    radius * ring as f32 / 4.0,
                    palette.primary.gamma_multiply(0.025),
                );
            }
        }
    }
}

fn to_glam(pos: Pos2) -> Vec2 {
    Vec2::new(pos.x, pos.y)
}

fn bounds(rect: Rect) -> Bounds {
    Bounds::new(to_glam(rect.min), Vec2::new(rect.width(), rect.height()))
}

fn input_height(kind: FieldKind) -> f32 {
    match kind {
        FieldKind::Message => 120.0,
        FieldKind::Text | FieldKind::Email => 36.0,
    }
}

fn section_heading(painter: &egui::Painter, rect: Rect, title: &str, palette: &Palette) {
    painter.text(
        pos2(rect.center().x, rect.top() + SECTION_PADDING),
        Align2::CENTER_TOP,
        title,
        FontId::proportional(36.0),
        palette.text,
    );
}

fn text_size(ui: &egui::Ui, text: &str, font: &FontId) -> egui::Vec2 {
    ui.fonts(|fonts| {
        fonts
            .layout_no_wrap(text.to_owned(), font.clone(), Color32::WHITE)
            .size()
    })
}

/// Places boxes left to right, wrapping onto a new row when the next box
/// would pass `max_width`. Returns each box's offset and the total height.
fn flow_boxes(sizes: &[egui::Vec2], max_width: f32, gap: f32) -> (Vec<egui::Vec2>, f32) {
    let mut offsets = Vec::with_capacity(sizes.len());
    let (mut x, mut y, mut row_height) = (0.0f32, 0.0f32, 0.0f32);

    for size in sizes {
        if x > 0.0 && x + size.x > max_width {
            x = 0.0;
            y += row_height + gap;
            row_height = 0.0;
        }
        offsets.push(vec2(x, y));
        x += size.x + gap;
        row_height = row_height.max(size.y);
    }

    (offsets, y + row_height)
}

fn flow_words<S: AsRef<str>>(
    ui: &egui::Ui,
    words: &[S],
    font: &FontId,
    max_width: f32,
) -> (Vec<egui::Vec2>, f32) {
    let space = text_size(ui, " ", font).x;
    let line = ui.fonts(|fonts| fonts.row_height(font)) * 1.4;
    let sizes: Vec<egui::Vec2> = words
        .iter()
        .map(|word| vec2(text_size(ui, word.as_ref(), font).x, line))
        .collect();
    flow_boxes(&sizes, max_width, space)
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;

    use super::*;
    use crate::form::SimulatedTransport;
    use crate::timer::ms;

    fn page(size: Vec2) -> PortfolioPage {
        PortfolioPage::new(
            size,
            ColorScheme::Dark,
            8,
            StdRng::seed_from_u64(1),
            Box::new(SimulatedTransport::new(ms(2000), 1.0, StdRng::seed_from_u64(2))),
        )
    }

    fn frame(page: &mut PortfolioPage, ctx: &egui::Context, size: Vec2) {
        let input = egui::RawInput {
            screen_rect: Some(Rect::from_min_size(Pos2::ZERO, vec2(size.x, size.y))),
            ..Default::default()
        };
        let _ = ctx.run(input, |ctx| page.ui(ctx));
    }

    #[test]
    fn boxes_wrap_at_the_edge() {
        let sizes = [vec2(40.0, 10.0), vec2(40.0, 10.0), vec2(40.0, 12.0)];
        let (offsets, height) = flow_boxes(&sizes, 100.0, 5.0);

        assert_eq!(offsets[0], vec2(0.0, 0.0));
        assert_eq!(offsets[1], vec2(45.0, 0.0));
        assert_eq!(offsets[2], vec2(0.0, 15.0));
        assert_eq!(height, 27.0);
    }

    #[test]
    fn oversized_box_keeps_its_own_row() {
        let (offsets, height) = flow_boxes(&[vec2(300.0, 20.0)], 100.0, 5.0);
        assert_eq!(offsets, vec![vec2(0.0, 0.0)]);
        assert_eq!(height, 20.0);
    }

    #[test]
    fn escape_and_swipe_close_the_menu() {
        let mut page = page(Vec2::new(400.0, 800.0));

        page.menu.toggle();
        page.on_escape();
        assert!(!page.menu.is_open());

        page.menu.toggle();
        page.touch_start(Vec2::new(200.0, 300.0));
        page.touch_end(Vec2::new(200.0, 330.0));
        assert!(page.menu.is_open());

        page.touch_start(Vec2::new(200.0, 300.0));
        page.touch_end(Vec2::new(200.0, 380.0));
        assert!(!page.menu.is_open());
    }

    #[test]
    fn menu_closes_once_resized_to_desktop() {
        let mut page = page(Vec2::new(400.0, 800.0));
        page.menu.toggle();

        page.on_resize(Vec2::new(1280.0, 800.0));
        page.advance(ms(100));
        assert!(page.menu.is_open());
        assert!(page.is_animating());

        page.advance(ms(200));
        assert!(!page.menu.is_open());
        assert!(page.profile.is_desktop());
        assert!((page.metrics.hero_min_height() - 800.0).abs() < 1e-3);
    }

    #[test]
    fn scheme_change_marks_visuals() {
        let mut page = page(Vec2::new(1280.0, 800.0));
        page.visuals_dirty = false;

        page.set_scheme(ColorScheme::Dark);
        assert!(!page.visuals_dirty);

        page.set_scheme(ColorScheme::Light);
        assert!(page.visuals_dirty);
        assert_eq!(page.scheme(), ColorScheme::Light);
    }

    #[test]
    fn frame_lays_out_sections_in_order() {
        let size = Vec2::new(1280.0, 800.0);
        let mut page = page(size);
        let ctx = egui::Context::default();

        frame(&mut page, &ctx, size);
        frame(&mut page, &ctx, size);

        let order: Vec<Section> = page.section_spans.iter().map(|(s, _)| *s).collect();
        assert_eq!(order, Section::ALL);
        for pair in page.section_spans.windows(2) {
            let (_, above) = pair[0];
            let (_, below) = pair[1];
            assert!(below.top >= above.bottom() - 0.5);
        }

        // the hero fills the first screen and is the active section
        assert_eq!(page.section_spans[0].1.height, 800.0);
        assert_eq!(page.active, Some(Section::Home));
        assert!(page.sections.is_revealed(Section::Home));
        assert!(!page.sections.is_revealed(Section::Contact));
    }
}
