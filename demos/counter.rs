//! Counter - entities, views, and click dispatch
//!
//! A minimal interactive app driven without a display:
//! - An entity holds the count; its view renders two buttons and a label
//! - Synthetic mouse and key input is queued, hit tested, and dispatched
//! - Subscribers observe the entity's "changed" events
//! - Every frame is presented to the in-memory test platform
//!
//! Run with: cargo run --example counter

use std::rc::Rc;

use ember_ui::{
    block, label, point, size, AnyElement, AnyView, App, Ctx, IntoElement, Modifiers, MouseButton,
    PlatformInput, Render, Rgba, TestPlatform, Window,
};

struct Counter {
    count: i32,
}

impl Counter {
    fn set(&mut self, count: i32, cx: &mut Ctx<Self>) {
        self.count = count;
        let count = self.count;
        cx.emit("changed", count);
        cx.notify();
    }
}

impl Render for Counter {
    fn render(&mut self, _window: &mut Window, cx: &mut Ctx<Self>) -> AnyElement {
        let handle = cx.handle();
        let button = |text: &str| {
            block()
                .w(40.0)
                .h(24.0)
                .bg(Rgba::from_rgb_int(0x3a3f4b))
                .rounded(4.0)
                .p(4.0)
                .child(label(text).color(Rgba::WHITE))
        };

        block()
            .w_full()
            .h_full()
            .p(8.0)
            .gap(8.0)
            .on_action("reset", move |_, cx| {
                cx.update_entity(&handle, |counter, cx| counter.set(0, cx))
                    .unwrap();
            })
            .child(button("+").on_click(move |_, cx| {
                cx.update_entity(&handle, |counter, cx| {
                    let next = counter.count + 1;
                    counter.set(next, cx);
                })
                .unwrap();
            }))
            .child(button("-").on_click(move |_, cx| {
                cx.update_entity(&handle, |counter, cx| {
                    let next = counter.count - 1;
                    counter.set(next, cx);
                })
                .unwrap();
            }))
            .child(label(format!("count: {}", self.count)))
            .into_any()
    }
}

fn click(app: &mut App, window: ember_ui::WindowId, x: f32, y: f32) -> ember_ui::Result<()> {
    app.push_input(
        window,
        PlatformInput::MouseDown {
            position: point(x, y),
            button: MouseButton::Left,
            modifiers: Modifiers::empty(),
        },
    )?;
    app.push_input(
        window,
        PlatformInput::MouseUp {
            position: point(x, y),
            button: MouseButton::Left,
            modifiers: Modifiers::empty(),
        },
    )
}

fn main() -> ember_ui::Result<()> {
    let platform = Rc::new(TestPlatform::new());
    let mut app = App::with_platform(platform.clone());

    println!("=== ember-ui counter ===\n");

    let counter = app.new_entity(|_| Counter { count: 0 });
    app.subscribe(&counter, "changed", |payload, _| {
        if let Some(count) = payload.downcast_ref::<i32>() {
            println!("  changed event: count = {count}");
        }
    });

    let window = app.open_window(size(320.0, 240.0), |window, _| {
        window.bind_key("ctrl-r", "reset", None).unwrap();
        AnyView::from(counter)
    });

    app.render_frame(window)?;
    if let Some(frame) = platform.last_frame() {
        println!(
            "first frame: {} primitives at {:?}",
            frame.primitives().count(),
            frame.viewport,
        );
    }

    // The [+] button sits at (8, 8), the [-] button at (56, 8).
    println!("\nclicking [+] twice, then [-] once:");
    click(&mut app, window, 28.0, 20.0)?;
    click(&mut app, window, 28.0, 20.0)?;
    click(&mut app, window, 76.0, 20.0)?;
    app.render_frame(window)?;
    println!("count is now {}", app.read_entity(&counter)?.count);

    println!("\npressing ctrl-r:");
    app.push_input(
        window,
        PlatformInput::KeyDown {
            keystroke: ember_ui::Keystroke::parse("ctrl-r").unwrap(),
        },
    )?;
    app.render_frame(window)?;
    println!("count is now {}", app.read_entity(&counter)?.count);

    println!(
        "\n{} frames presented, {} entity live",
        platform.frame_count(),
        app.entity_count(),
    );
    Ok(())
}
