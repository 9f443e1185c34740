use std::time::Duration;

use attnviz::config::TabId;
use attnviz::panel::PanelOutput;
use attnviz::tutorial::{Event, Tutorial};
use leptos::prelude::*;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_time::Instant;

use crate::ui_model::{parse_slider_value, tab_description, tab_icon, Slider};

mod canvas;
mod charts;

const FRAME_MS: i32 = 100;
const SCENE_CANVAS_ID: &str = "scene-canvas";
const CHART_BG: &str = "#1a202c";
const CHART_GRID: &str = "rgba(160, 174, 192, 0.35)";

pub fn start() {
    mount_to_body(|| view! { <App /> });
}

fn warn(msg: &str) {
    web_sys::console::warn_1(&JsValue::from_str(msg));
}

#[component]
fn App() -> impl IntoView {
    let tutorial = StoredValue::new_local(Tutorial::default());
    let last_frame = StoredValue::new_local(Instant::now());

    let config = RwSignal::new(tutorial.with_value(|t| t.config()));
    let output = RwSignal::new(tutorial.with_value(|t| t.render()));
    let ceiling = RwSignal::new(Slider::SeriesCeiling.range().default);
    let (interval_id, set_interval_id) = signal::<Option<i32>>(None);

    let refresh = move || {
        config.set(tutorial.with_value(|t| t.config()));
        output.set(tutorial.with_value(|t| t.render()));
        if let Some(c) = tutorial.with_value(|t| t.panel().map(|p| p.series_ceiling())) {
            ceiling.set(c);
        }
    };

    let dispatch = move |event: Event| {
        let outcome = tutorial
            .try_update_value(|t| t.handle(event))
            .unwrap_or_default();
        if outcome.needs_redraw() {
            refresh();
        }
    };

    let do_frame = move || {
        let now = Instant::now();
        let ms = last_frame.with_value(|l| now.duration_since(*l).as_millis() as u64);
        last_frame.update_value(|l| *l += Duration::from_millis(ms));
        dispatch(Event::Elapsed { ms });
    };

    // Start the frame pump once; the panels' own tickers run on engine time.
    if let Some(window) = web_sys::window() {
        let cb = Closure::wrap(Box::new(move || {
            do_frame();
        }) as Box<dyn FnMut()>);
        match window.set_interval_with_callback_and_timeout_and_arguments_0(
            cb.as_ref().unchecked_ref(),
            FRAME_MS,
        ) {
            Ok(id) => {
                cb.forget();
                set_interval_id.set(Some(id));
            }
            Err(_) => warn("failed to start interval"),
        }
    }

    on_cleanup(move || {
        if let Some(id) = interval_id.get_untracked() {
            if let Some(w) = web_sys::window() {
                w.clear_interval_with_handle(id);
            }
        }
    });

    Effect::new(move |_| {
        output.with(|out| {
            if let Some(out) = out {
                paint(out);
            }
        });
    });

    let global_sliders = Slider::global()
        .iter()
        .map(|&slider| {
            let value = Signal::derive(move || match slider {
                Slider::HeadDimension => config.get().head_dimension,
                _ => config.get().sequence_length,
            });
            let on_change = move |v: u32| {
                dispatch(match slider {
                    Slider::HeadDimension => Event::SetHeadDimension(v),
                    _ => Event::SetSequenceLength(v),
                })
            };
            slider_view(slider, value, on_change)
        })
        .collect_view();

    let tab_bar = TabId::all()
        .iter()
        .map(|&tab| {
            view! {
                <button
                    class="tab"
                    class:active=move || config.get().active_tab == tab
                    on:click=move |_| dispatch(Event::SelectTab(tab.label().to_string()))
                >
                    {tab_icon(tab)} " " {tab.display_name()}
                </button>
            }
        })
        .collect_view();

    view! {
        <div class="app">
            <h1>"Understanding Attention and FlashAttention"</h1>
            <div class="controls">{global_sliders}</div>
            <nav class="tabs">{tab_bar}</nav>
            <section class="panel">
                <h2>{move || output.with(|o| o.as_ref().map(|o| o.title).unwrap_or_default())}</h2>
                <p class="description">{move || tab_description(config.get().active_tab)}</p>
                <Show when=move || config.get().active_tab == TabId::Performance>
                    {move || {
                        slider_view(
                            Slider::SeriesCeiling,
                            Signal::derive(move || ceiling.get()),
                            move |v| dispatch(Event::SetSeriesCeiling(v)),
                        )
                    }}
                </Show>
                <canvas id=SCENE_CANVAS_ID width="800" height="400"></canvas>
                <ul class="captions">
                    {move || {
                        output.with(|o| {
                            o.iter()
                                .flat_map(|o| o.captions.clone())
                                .map(|c| view! { <li>{c}</li> })
                                .collect_view()
                        })
                    }}
                </ul>
                <ul class="metrics">
                    {move || {
                        output.with(|o| {
                            o.iter()
                                .flat_map(|o| o.metrics.clone())
                                .map(|m| view! { <li>{m}</li> })
                                .collect_view()
                        })
                    }}
                </ul>
            </section>
        </div>
    }
}

fn slider_view<F>(slider: Slider, value: Signal<u32>, on_change: F) -> impl IntoView
where
    F: Fn(u32) + Copy + Send + Sync + 'static,
{
    let range = slider.range();
    view! {
        <div class="slider">
            <label for=slider.input_id()>{move || slider.caption(value.get())}</label>
            <input
                id=slider.input_id()
                type="range"
                min=range.min.to_string()
                max=range.max.to_string()
                step=range.step.to_string()
                prop:value=move || value.get().to_string()
                on:input=move |ev| {
                    if let Some(v) = parse_slider_value(&event_target_value(&ev)) {
                        on_change(v);
                    }
                }
            />
        </div>
    }
}

fn paint(out: &PanelOutput) {
    let Some(canvas) = canvas::canvas_by_id(SCENE_CANVAS_ID) else {
        return;
    };
    let res = match (&out.scene, &out.series) {
        (Some(scene), _) => canvas::paint_scene(&canvas, scene),
        (None, Some(series)) => charts::draw_series_chart(&canvas, series, CHART_BG, CHART_GRID),
        (None, None) => Ok(()),
    };
    if let Err(e) = res {
        warn(&e);
    }
}
