#![cfg(target_arch = "wasm32")]

use crate::{
    Category, Drug, Phase, RoundOutcome, Session, SessionError, Summary, Verdict, demo_drugs,
    load_bytes,
};
use leptos::*;
use rand::SeedableRng;
use rand::rngs::StdRng;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use web_sys::{File, HtmlInputElement};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scene {
    Setup,
    Game,
    Results,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum SetupTab {
    Upload,
    Sample,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum FeedbackKind {
    Success,
    Partial,
}

#[derive(Clone, PartialEq, Eq)]
struct FeedbackState {
    heading: String,
    message: String,
    kind: FeedbackKind,
}

impl FeedbackState {
    fn from_outcome(outcome: &RoundOutcome) -> Self {
        if outcome.is_perfect() {
            Self {
                heading: "Perfect!".to_string(),
                message: "You got all 5 attributes correct!".to_string(),
                kind: FeedbackKind::Success,
            }
        } else {
            let message = if outcome.missed.is_empty() {
                String::new()
            } else {
                "Review the highlighted items above.".to_string()
            };

            Self {
                heading: format!("{}/5 Correct", outcome.correct_count),
                message,
                kind: FeedbackKind::Partial,
            }
        }
    }
}

/// A normalized drug list together with where it came from.
#[derive(Clone, PartialEq, Eq)]
struct LoadedData {
    source: String,
    drugs: Vec<Drug>,
}

fn session_rng() -> StdRng {
    StdRng::from_entropy()
}

fn scene_for(phase: &Phase) -> Scene {
    match phase {
        Phase::Setup => Scene::Setup,
        Phase::Selecting | Phase::Submitted(_) => Scene::Game,
        Phase::Results => Scene::Results,
    }
}

async fn read_file_bytes(file: &File) -> Result<Vec<u8>, String> {
    let promise: js_sys::Promise = file.array_buffer();

    let buffer = JsFuture::from(promise).await.map_err(|error| format!("{error:?}"))?;

    Ok(js_sys::Uint8Array::new(&buffer).to_vec())
}

/// Message to show for a session action, `None` once it succeeds.
fn transition_error(action: &str, result: &Result<(), SessionError>) -> Option<String> {
    result.as_ref().err().map(|failure| {
        log::warn!("{action} rejected: {failure}");
        failure.to_string()
    })
}

fn option_classes(selected: bool, verdict: Option<Verdict>) -> String {
    let mut classes = vec!["option-card"];

    if selected {
        classes.push("selected");
    }

    if let Some(verdict) = verdict {
        classes.push("disabled");
        match verdict {
            Verdict::Correct => classes.push("correct"),
            Verdict::Incorrect => classes.push("incorrect"),
            Verdict::Missed => classes.push("missed"),
            Verdict::Unselected => {}
        }
    }

    classes.join(" ")
}

#[component]
fn SetupPanel(
    data: ReadSignal<Option<LoadedData>>,
    error: ReadSignal<Option<String>>,
    on_file: Callback<File>,
    on_sample: Callback<()>,
    on_clear: Callback<()>,
    on_start: Callback<()>,
) -> impl IntoView {
    let (tab, set_tab) = create_signal(SetupTab::Upload);
    let (file_name, set_file_name) = create_signal(String::new());

    let on_change = move |ev: ev::Event| {
        let input = event_target::<HtmlInputElement>(&ev);
        if let Some(file) = input.files().and_then(|files| files.get(0)) {
            set_file_name.set(file.name());
            on_file.call(file);
        }
    };

    let tab_class = move |target: SetupTab| {
        if tab.get() == target {
            "tab-btn active"
        } else {
            "tab-btn"
        }
    };

    let clear = move |_| {
        set_file_name.set(String::new());
        on_clear.call(());
    };

    view! {
        <section class="setup-panel">
            <div class="tabs">
                <button class=move || tab_class(SetupTab::Upload) on:click=move |_| set_tab.set(SetupTab::Upload)>
                    "Upload file"
                </button>
                <button class=move || tab_class(SetupTab::Sample) on:click=move |_| set_tab.set(SetupTab::Sample)>
                    "Sample data"
                </button>
            </div>

            <Show
                when=move || tab.get() == SetupTab::Upload
                fallback=move || view! {
                    <div class="tab-content">
                        <p class="lede">"Ten cardiovascular drugs to practice with."</p>
                        <button class="btn" on:click=move |_| on_sample.call(())>"Load sample data"</button>
                    </div>
                }
            >
                <div class="tab-content">
                    <p class="lede">"CSV, tab-separated, JSON or an Excel sheet with one row per drug."</p>
                    <input type="file" accept=".csv,.tsv,.txt,.json,.xlsx,.xls" on:change=on_change />
                    <span class="file-name">{move || file_name.get()}</span>
                </div>
            </Show>

            {move || error.get().map(|message| view! {
                <div class="error-card">
                    <p class="eyebrow">"Could not load data"</p>
                    <p class="error-body">{message}</p>
                </div>
            })}

            {move || data.get().map(|loaded| {
                let names = loaded
                    .drugs
                    .iter()
                    .map(|drug| drug.name.as_str())
                    .collect::<Vec<_>>()
                    .join(", ");

                view! {
                    <div class="data-preview">
                        <p class="label">{format!("{} drugs from {}", loaded.drugs.len(), loaded.source)}</p>
                        <p class="drug-list-preview">{names}</p>
                    </div>
                }
            })}

            <div class="controls-buttons">
                <button
                    class="primary"
                    disabled=move || data.with(|loaded| loaded.as_ref().is_none_or(|loaded| loaded.drugs.len() < crate::MIN_POOL_SIZE))
                    on:click=move |_| on_start.call(())
                >
                    "Start game"
                </button>
                <button class="btn" disabled=move || data.with(Option::is_none) on:click=clear>
                    "Clear data"
                </button>
            </div>
        </section>
    }
}

#[component]
fn CategoryTracker(session: RwSignal<Session>) -> impl IntoView {
    view! {
        <ul class="tracker">
            {Category::ALL
                .into_iter()
                .map(|category| {
                    let class = move || {
                        if session.with(|session| session.selection_for(category).is_some()) {
                            format!("tracker-item selected {}", category.key())
                        } else {
                            format!("tracker-item {}", category.key())
                        }
                    };
                    view! { <li class=class>{category.display_name()}</li> }
                })
                .collect_view()}
        </ul>
    }
}

#[component]
fn GamePanel(
    session: RwSignal<Session>,
    error: ReadSignal<Option<String>>,
    on_select: Callback<usize>,
    on_submit: Callback<()>,
    on_skip: Callback<()>,
    on_next: Callback<()>,
    on_back: Callback<()>,
) -> impl IntoView {
    let outcome = move || {
        session.with(|session| match session.phase() {
            Phase::Submitted(outcome) => Some(outcome.clone()),
            _ => None,
        })
    };

    view! {
        <section class="game-panel">
            <header class="game-header">
                <p class="progress">
                    {move || session.with(|session| format!("Drug {} of {}", session.round_number(), session.total_rounds()))}
                </p>
                <p class="score">{move || session.with(|session| format!("Score: {}", session.stats().score))}</p>
            </header>

            <h2 class="drug-name">
                {move || session.with(|session| session.current_drug().map(|drug| drug.name.clone()).unwrap_or_default())}
            </h2>

            {move || error.get().map(|message| view! {
                <div class="error-card">
                    <p class="error-body">{message}</p>
                </div>
            })}

            <CategoryTracker session=session />

            <div class="options-grid">
                {move || {
                    let verdicts = outcome().map(|outcome| outcome.verdicts);
                    session.with(|session| {
                        session
                            .options()
                            .iter()
                            .enumerate()
                            .map(|(index, option)| {
                                let verdict = verdicts.as_ref().and_then(|verdicts| verdicts.get(index).copied());
                                let classes = option_classes(session.is_selected(index), verdict);
                                let locked = verdict.is_some();

                                view! {
                                    <div
                                        class=classes
                                        data-category=option.category.key()
                                        on:click=move |_| {
                                            if !locked {
                                                on_select.call(index);
                                            }
                                        }
                                    >
                                        <span class="category-tag">{option.category.display_name()}</span>
                                        <div class="option-text">{option.text.clone()}</div>
                                    </div>
                                }
                            })
                            .collect_view()
                    })
                }}
            </div>

            <div class="controls-buttons">
                <button
                    class="primary"
                    disabled=move || !session.with(Session::can_submit)
                    on:click=move |_| on_submit.call(())
                >
                    "Submit"
                </button>
                <Show when=move || outcome().is_none()>
                    <button class="btn" on:click=move |_| on_skip.call(())>"Skip"</button>
                </Show>
                <button class="btn" on:click=move |_| on_back.call(())>"Back to setup"</button>
            </div>

            {move || outcome().map(|outcome| {
                let feedback = FeedbackState::from_outcome(&outcome);
                let class = match feedback.kind {
                    FeedbackKind::Success => "feedback success",
                    FeedbackKind::Partial => "feedback partial",
                };
                let next_label = if session.with(Session::is_last_round) {
                    "See Results →"
                } else {
                    "Next Drug →"
                };

                view! {
                    <div class=class>
                        <h3>{feedback.heading}</h3>
                        <p>{feedback.message}</p>
                        <button class="primary" on:click=move |_| on_next.call(())>{next_label}</button>
                    </div>
                }
            })}
        </section>
    }
}

#[component]
fn ResultsPanel(summary: Summary, on_again: Callback<()>, on_new_set: Callback<()>) -> impl IntoView {
    let review = summary.has_review().then(|| {
        view! {
            <section class="review-section">
                <h3>"Review"</h3>
                {summary
                    .missed_items
                    .iter()
                    .map(|item| view! {
                        <div class="missed-item">
                            <h4>{item.drug.clone()}</h4>
                            {item
                                .missed
                                .iter()
                                .map(|missed| view! {
                                    <div class="correct-answer">
                                        <strong>{format!("{}:", missed.category.display_name())}</strong>
                                        " "
                                        {missed.correct.clone()}
                                    </div>
                                })
                                .collect_view()}
                        </div>
                    })
                    .collect_view()}
            </section>
        }
    });

    view! {
        <section class="results-panel">
            <div class="status-panel">
                <div class="status-item">
                    <p class="label">"Final score"</p>
                    <p class="value">{summary.score.to_string()}</p>
                </div>
                <div class="status-item">
                    <p class="label">"Perfect matches"</p>
                    <p class="value">{summary.perfect_matches.to_string()}</p>
                </div>
                <div class="status-item">
                    <p class="label">"Accuracy"</p>
                    <p class="value">{format!("{}%", summary.accuracy)}</p>
                </div>
            </div>
            {review}
            <div class="controls-buttons">
                <button class="primary" on:click=move |_| on_again.call(())>"Play again"</button>
                <button class="btn" on:click=move |_| on_new_set.call(())>"New drug set"</button>
            </div>
        </section>
    }
}

#[component]
fn App() -> impl IntoView {
    let session = create_rw_signal(Session::new());
    let (data, set_data) = create_signal::<Option<LoadedData>>(None);
    let (error, set_error) = create_signal::<Option<String>>(None);

    let scene = move || session.with(|session| scene_for(session.phase()));

    let report = move |action: &str, result: Result<(), SessionError>| {
        set_error.set(transition_error(action, &result));
    };

    let on_file = Callback::new(move |file: File| {
        spawn_local(async move {
            let name = file.name();
            let loaded = read_file_bytes(&file)
                .await
                .and_then(|bytes| load_bytes(&name, &bytes).map_err(|error| error.to_string()));

            match loaded {
                Ok(drugs) => {
                    log::info!("loaded {} drugs from {name}", drugs.len());
                    set_error.set(None);
                    set_data.set(Some(LoadedData { source: name, drugs }));
                }
                Err(message) => {
                    log::warn!("failed to load {name}: {message}");
                    set_data.set(None);
                    set_error.set(Some(message));
                }
            }
        });
    });

    let on_sample = Callback::new(move |_| {
        set_error.set(None);
        set_data.set(Some(LoadedData {
            source: "sample data".to_string(),
            drugs: demo_drugs(),
        }));
    });

    let on_clear = Callback::new(move |_| {
        set_error.set(None);
        set_data.set(None);
    });

    let on_start = Callback::new(move |_| {
        let drugs = data.with(|loaded| {
            loaded
                .as_ref()
                .map(|loaded| loaded.drugs.clone())
                .unwrap_or_default()
        });
        let result = session.try_update(|session| session.start(&mut session_rng(), drugs));
        if let Some(result) = result {
            report("start", result);
        }
    });

    let on_select = Callback::new(move |index: usize| {
        if let Some(result) = session.try_update(|session| session.select(index)) {
            report("select", result);
        }
    });

    let on_submit = Callback::new(move |_| {
        if let Some(result) = session.try_update(|session| session.submit().map(|_| ())) {
            report("submit", result);
        }
    });

    let on_skip = Callback::new(move |_| {
        if let Some(result) = session.try_update(|session| session.skip(&mut session_rng())) {
            report("skip", result);
        }
    });

    let on_next = Callback::new(move |_| {
        if let Some(result) = session.try_update(|session| session.advance(&mut session_rng())) {
            report("advance", result);
        }
    });

    let on_back = Callback::new(move |_| {
        session.update(Session::abandon);
        set_error.set(None);
    });

    let on_again = Callback::new(move |_| {
        if let Some(result) = session.try_update(|session| session.restart(&mut session_rng())) {
            report("restart", result);
        }
    });

    view! {
        <main class="page">
            <header class="page-header">
                <p class="eyebrow">"Pharm Match"</p>
                <h1 class="headline">"Drug attribute matching"</h1>
                <p class="lede">"Match the mechanism, indications, adverse events, interactions and contraindications to each drug."</p>
            </header>

            {move || match scene() {
                Scene::Setup => view! {
                    <SetupPanel
                        data=data
                        error=error
                        on_file=on_file
                        on_sample=on_sample
                        on_clear=on_clear
                        on_start=on_start
                    />
                }
                .into_view(),
                Scene::Game => view! {
                    <GamePanel
                        session=session
                        error=error
                        on_select=on_select
                        on_submit=on_submit
                        on_skip=on_skip
                        on_next=on_next
                        on_back=on_back
                    />
                }
                .into_view(),
                Scene::Results => view! {
                    <ResultsPanel
                        summary=session.with(Session::summary)
                        on_again=on_again
                        on_new_set=on_back
                    />
                }
                .into_view(),
            }}
        </main>
    }
}

#[wasm_bindgen(start)]
pub fn main() {
    console_error_panic_hook::set_once();
    wasm_logger::init(wasm_logger::Config::default());
    log::info!("Logging initialized");
    mount_to_body(|| view! { <App /> });
}
