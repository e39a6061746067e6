// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Hover intent, lock, and dismissal on a simulated page.
//!
//! Replays a scripted sequence of pointer, keyboard, and resize events against
//! an `OverlayEngine` and prints what the host toolkit would do after each one:
//! listeners to install or remove, layers to mount, and focus to restore.
//!
//! Run:
//! - `cargo run -p understory_demos --example overlay_hover`

use core::time::Duration;

use kurbo::{Rect, Size};
use understory_overlay::config::OverlayConfig;
use understory_overlay::engine::{
    EngineOutput, MeasureOverlays, OverlayEngine, SurfaceEvent, TriggerEvent,
};
use understory_overlay::host::damage_bounds;
use understory_overlay::types::Key;
use understory_placement::Placement;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
enum Node {
    Root,
    Tooltip,
    HelpIcon,
    TooltipSurface,
    Popover,
    MenuButton,
    PopoverSurface,
    Body,
}

struct Page;

impl MeasureOverlays<Node> for Page {
    fn trigger_bounds(&self, overlay: &Node) -> Option<Rect> {
        match overlay {
            Node::Tooltip => Some(Rect::from_origin_size((600.0, 10.0), (24.0, 24.0))),
            Node::Popover => Some(Rect::from_origin_size((1200.0, 400.0), (60.0, 28.0))),
            _ => None,
        }
    }

    fn surface_size(&self, overlay: &Node) -> Option<Size> {
        match overlay {
            Node::Tooltip => Some(Size::new(220.0, 60.0)),
            Node::Popover => Some(Size::new(300.0, 200.0)),
            _ => None,
        }
    }
}

fn report(step: &str, engine: &OverlayEngine<Node>, out: &EngineOutput<Node>) {
    println!("== {step}");
    if !out.listeners.is_empty() {
        println!(
            "   listeners: +{:?} -{:?}",
            out.listeners.install, out.listeners.remove
        );
    }
    for (overlay, effect) in &out.effects {
        println!("   {overlay:?}: {effect:?}");
    }
    if let Some(damage) = damage_bounds(&out.layers) {
        println!("   repaint {damage:?}");
    }
    for overlay in &out.restore_focus {
        println!("   focus -> trigger of {overlay:?}");
    }
    for overlay in [Node::Tooltip, Node::Popover] {
        if let Some(view) = engine.view(&overlay) {
            if view.is_open {
                println!(
                    "   {overlay:?} shown {:?} at {:?} ({:?})",
                    view.placement, view.position, view.mode
                );
            }
        }
    }
}

fn main() {
    let ms = Duration::from_millis;
    let mut engine = OverlayEngine::new(Size::new(1280.0, 800.0));

    let out = engine
        .mount(
            Node::Tooltip,
            Node::HelpIcon,
            Node::TooltipSurface,
            OverlayConfig::default(),
        )
        .unwrap();
    report("mount tooltip", &engine, &out);
    let out = engine
        .mount(
            Node::Popover,
            Node::MenuButton,
            Node::PopoverSurface,
            OverlayConfig::default()
                .with_placement(Placement::Right)
                .with_track_viewport(true),
        )
        .unwrap();
    report("mount popover", &engine, &out);

    let out = engine.trigger(Node::Tooltip, TriggerEvent::PointerEnter, ms(0), &Page);
    report("pointer enters help icon", &engine, &out);
    let out = engine.tick(ms(120), &Page);
    report("tick 120ms (still pending)", &engine, &out);
    let deadline = engine.next_deadline().unwrap_or(ms(200));
    let out = engine.tick(deadline, &Page);
    report("tick at deadline", &engine, &out);

    let out = engine.trigger(Node::Tooltip, TriggerEvent::PointerLeave, ms(400), &Page);
    report("pointer leaves help icon", &engine, &out);
    let out = engine.surface(Node::Tooltip, SurfaceEvent::PointerEnter, ms(450), &Page);
    report("pointer reaches tooltip surface", &engine, &out);

    let out = engine.pointer_down(&[Node::Root, Node::MenuButton], ms(600), &Page);
    report("press on menu button (capture)", &engine, &out);
    let out = engine.trigger(Node::Popover, TriggerEvent::Click, ms(600), &Page);
    report("click menu button", &engine, &out);

    let out = engine.pointer_down(&[Node::Root, Node::PopoverSurface], ms(700), &Page);
    report("press inside popover", &engine, &out);

    let out = engine.resize(Size::new(375.0, 667.0), ms(800), &Page);
    report("resize to phone", &engine, &out);

    let out = engine.key_down(Key::Escape, ms(900), &Page);
    report("escape", &engine, &out);

    let out = engine.pointer_down(&[Node::Root, Node::Body], ms(1000), &Page);
    report("press on body", &engine, &out);

    let out = engine.unmount_all();
    report("unmount all", &engine, &out);
}
