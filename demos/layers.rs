//! Layers - scrolling, tooltips, and deferred overlays
//!
//! Walks the parts of a frame that live above the main tree:
//! - A scrollable list consumes wheel input through its scroll handle
//! - A button shows a tooltip after the hover delay elapses
//! - Clicking the button defers a modal overlay that captures input
//!   over everything beneath it; clicking the scrim dismisses it
//!
//! Run with: cargo run --example layers

use std::rc::Rc;
use std::time::Duration;

use ember_ui::{
    block, deferred, label, point, size, AnyElement, AnyView, App, Ctx, IntoElement, Modifiers,
    MouseButton, PlatformInput, Primitive, Render, Rgba, ScrollDelta, ScrollHandle, TestPlatform,
    Window,
};

struct Shell {
    rows: ScrollHandle,
    show_modal: bool,
}

impl Render for Shell {
    fn render(&mut self, _window: &mut Window, cx: &mut Ctx<Self>) -> AnyElement {
        let open = cx.handle();
        let close = cx.handle();

        let mut root = block()
            .w_full()
            .h_full()
            .flex_col()
            .p(10.0)
            .gap(10.0)
            .child(
                block()
                    .w(120.0)
                    .h(28.0)
                    .bg(Rgba::from_rgb_int(0x2d5b9e))
                    .rounded(4.0)
                    .p(4.0)
                    .tooltip("open the overlay")
                    .on_click(move |_, cx| {
                        cx.update_entity(&open, |shell, cx| {
                            shell.show_modal = true;
                            cx.notify();
                        })
                        .unwrap();
                    })
                    .child(label("open modal").color(Rgba::WHITE)),
            )
            .child(
                block()
                    .w(200.0)
                    .h(150.0)
                    .bg(Rgba::from_rgb_int(0x24262e))
                    .overflow_scroll(&self.rows)
                    .child(
                        block()
                            .w(180.0)
                            .flex_col()
                            .children((0..30).map(|i| {
                                block()
                                    .w_full()
                                    .h(20.0)
                                    .child(label(format!("row {i}")))
                            })),
                    ),
            );

        if self.show_modal {
            root = root.child(
                deferred(
                    block()
                        .w_full()
                        .h_full()
                        .bg(Rgba::BLACK.with_alpha(0.5))
                        .justify_center()
                        .items_center()
                        .on_click(move |_, cx| {
                            cx.update_entity(&close, |shell, cx| {
                                shell.show_modal = false;
                                cx.notify();
                            })
                            .unwrap();
                        })
                        .child(
                            block()
                                .w(220.0)
                                .h(120.0)
                                .bg(Rgba::from_rgb_int(0x3a3f4b))
                                .rounded(6.0)
                                .p(12.0)
                                .child(label("anything beneath is shadowed")),
                        ),
                )
                .with_priority(1),
            );
        }
        root.into_any()
    }
}

fn text_run_present(platform: &TestPlatform, needle: &str) -> bool {
    platform.last_frame().is_some_and(|frame| {
        frame
            .primitives()
            .any(|primitive| matches!(primitive, Primitive::TextRun(run) if run.text == needle))
    })
}

fn main() -> ember_ui::Result<()> {
    let platform = Rc::new(TestPlatform::new());
    let mut app = App::with_platform(platform.clone());

    println!("=== ember-ui layers ===\n");

    let rows = ScrollHandle::new();
    let shell_rows = rows.clone();
    let shell = app.new_entity(|_| Shell {
        rows: shell_rows,
        show_modal: false,
    });
    let window = app.open_window(size(400.0, 300.0), |_, _| AnyView::from(shell));
    app.render_frame(window)?;

    // The list viewport is 150 high over 600 of content.
    println!("scroll offset before wheel: {}", rows.offset().y);
    app.push_input(
        window,
        PlatformInput::ScrollWheel {
            position: point(110.0, 120.0),
            delta: ScrollDelta::Lines(point(0.0, 2.0)),
            modifiers: Modifiers::empty(),
        },
    )?;
    app.render_frame(window)?;
    println!("scroll offset after wheel:  {}", rows.offset().y);

    // Hover the button; the tooltip waits out the delay before showing.
    app.push_input(
        window,
        PlatformInput::MouseMove {
            position: point(30.0, 20.0),
            modifiers: Modifiers::empty(),
        },
    )?;
    app.render_frame(window)?;
    println!("\ntooltip right after hover: {}", text_run_present(&platform, "open the overlay"));
    platform.advance_clock(Duration::from_millis(600));
    app.render_frame(window)?;
    println!("tooltip after 600ms:       {}", text_run_present(&platform, "open the overlay"));

    // Open the modal; the deferred overlay lays out against the full window.
    for event in [
        PlatformInput::MouseDown {
            position: point(30.0, 20.0),
            button: MouseButton::Left,
            modifiers: Modifiers::empty(),
        },
        PlatformInput::MouseUp {
            position: point(30.0, 20.0),
            button: MouseButton::Left,
            modifiers: Modifiers::empty(),
        },
    ] {
        app.push_input(window, event)?;
    }
    app.render_frame(window)?;
    println!(
        "\nmodal open: dialog text painted = {}",
        text_run_present(&platform, "anything beneath is shadowed"),
    );

    // A click in the middle now lands on the scrim, not the list below it.
    for event in [
        PlatformInput::MouseDown {
            position: point(200.0, 150.0),
            button: MouseButton::Left,
            modifiers: Modifiers::empty(),
        },
        PlatformInput::MouseUp {
            position: point(200.0, 150.0),
            button: MouseButton::Left,
            modifiers: Modifiers::empty(),
        },
    ] {
        app.push_input(window, event)?;
    }
    app.render_frame(window)?;
    println!(
        "after clicking the scrim:   dialog text painted = {}",
        text_run_present(&platform, "anything beneath is shadowed"),
    );

    println!("\n{} frames presented", platform.frame_count());
    Ok(())
}
