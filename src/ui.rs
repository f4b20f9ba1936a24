use crate::errors::AppError;
use crate::models::{GroupingVar, Series};
use crate::view::{ViewState, ViewUpdate};
use serde::Serialize;
use serde_json::Value;

const REPO_URL: &str = "https://github.com/laidleyt/tlc_trips";
const TLC_URL: &str = "https://www.nyc.gov/site/tlc/about/tlc-trip-record-data.page";

pub fn render_index(view: &ViewUpdate<'_>, figure: &Value) -> Result<String, AppError> {
    let state = view.state;
    Ok(INDEX_HTML
        .replace("{{SUBHEAD}}", view.subhead)
        .replace("{{SERIES_OPTIONS}}", &series_options(state.series))
        .replace("{{GROUPING_OPTIONS}}", &grouping_options(state.grouping))
        .replace("{{CHART_DISPLAY}}", display(view.chart_visible))
        .replace("{{ABOUT_DISPLAY}}", display(state.info_panel_visible))
        .replace("{{TOGGLE_LABEL}}", view.toggle_label)
        .replace("{{TOGGLE_HREF}}", &toggle_href(state))
        .replace("{{REPO_URL}}", REPO_URL)
        .replace("{{TLC_URL}}", TLC_URL)
        .replace("{{STATE_JSON}}", &script_json(&state)?)
        .replace("{{FIGURE_JSON}}", &script_json(figure)?))
}

fn series_options(selected: Series) -> String {
    Series::ALL
        .into_iter()
        .map(|series| {
            let checked = if series == selected { " checked" } else { "" };
            format!(
                r#"<label class="pill"><input type="radio" name="series" value="{value}"{checked} /><span>{label}</span></label>"#,
                value = series.as_str(),
                label = series.label(),
            )
        })
        .collect()
}

fn grouping_options(selected: GroupingVar) -> String {
    GroupingVar::ALL
        .into_iter()
        .map(|grouping| {
            let attr = if grouping == selected { " selected" } else { "" };
            format!(
                r#"<option value="{value}"{attr}>{label}</option>"#,
                value = grouping.as_str(),
                label = grouping.label(),
            )
        })
        .collect()
}

fn toggle_href(state: ViewState) -> String {
    format!(
        "/?series={}&amp;grouping={}&amp;about={}",
        state.series,
        state.grouping,
        !state.info_panel_visible
    )
}

fn display(visible: bool) -> &'static str {
    if visible { "block" } else { "none" }
}

// JSON embedded in a <script> block must not close the tag early.
fn script_json<T: Serialize + ?Sized>(value: &T) -> Result<String, AppError> {
    Ok(serde_json::to_string(value)?.replace("</", "<\\/"))
}

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>Daily Revenue &amp; Mileage</title>
  <script src="https://cdn.plot.ly/plotly-2.35.2.min.js" charset="utf-8"></script>
  <style>
    @import url('https://fonts.googleapis.com/css2?family=Space+Grotesk:wght@400;500;600&family=Fraunces:wght@600&display=swap');

    :root {
      --bg-1: #2c3e50;
      --bg-2: #3d566e;
      --ink: #f4f6f7;
      --accent: #18bc9c;
      --muted: #6c757d;
      --card: rgba(255, 255, 255, 0.96);
      --shadow: 0 24px 60px rgba(0, 0, 0, 0.25);
    }

    * {
      box-sizing: border-box;
    }

    body {
      margin: 0;
      min-height: 100vh;
      background: linear-gradient(135deg, var(--bg-1), var(--bg-2));
      color: var(--ink);
      font-family: "Space Grotesk", "Trebuchet MS", sans-serif;
      padding: 32px 18px 48px;
    }

    .dashboard {
      display: flex;
      flex-wrap: wrap;
      gap: 28px;
    }

    .controls {
      width: min(420px, 100%);
      display: grid;
      gap: 24px;
      align-content: start;
    }

    h1 {
      font-family: "Fraunces", "Georgia", serif;
      font-weight: 600;
      font-size: clamp(2rem, 4vw, 2.6rem);
      margin: 0;
    }

    h2 {
      font-size: 1.1rem;
      margin: 0 0 8px;
    }

    .subtitle {
      margin: 6px 0 0;
      font-size: 1.05rem;
      line-height: 1.4;
    }

    .pills {
      display: flex;
      gap: 6px;
    }

    .pill input {
      position: absolute;
      opacity: 0;
    }

    .pill span {
      display: inline-block;
      border: 1px solid var(--ink);
      border-radius: 999px;
      padding: 8px 18px;
      cursor: pointer;
      font-weight: 600;
    }

    .pill input:checked + span {
      background: var(--ink);
      color: var(--bg-1);
    }

    select {
      width: 100%;
      padding: 10px 12px;
      border-radius: 10px;
      border: none;
      font-size: 1rem;
      font-family: inherit;
    }

    .viewport {
      flex: 1 1 600px;
      min-width: 0;
    }

    #graph-wrapper {
      background: var(--card);
      border-radius: 20px;
      padding: 16px;
      box-shadow: var(--shadow);
      overflow-x: auto;
    }

    #chart {
      min-width: 600px;
      min-height: 420px;
    }

    #about-text {
      max-width: 700px;
      padding: 1rem 1.4rem;
      border-radius: 10px;
      background: var(--muted);
      font-size: 15px;
      line-height: 1.4;
    }

    #about-text a {
      color: #ffffff;
    }

    .footer {
      display: flex;
      justify-content: center;
      gap: 15px;
      margin-top: 40px;
    }

    .button {
      padding: 8px 16px;
      border-radius: 5px;
      background: #007bff;
      color: white;
      text-decoration: none;
      font-size: 14px;
      font-weight: bold;
      user-select: none;
    }

    .button.primary {
      background: var(--accent);
    }
  </style>
</head>
<body>
  <main class="dashboard">
    <form class="controls" id="controls" method="get" action="/">
      <header>
        <h1>Daily Revenue &amp; Mileage</h1>
        <p class="subtitle" id="subhead-text">{{SUBHEAD}}</p>
      </header>

      <div class="pills" role="radiogroup" aria-label="Data series">
        {{SERIES_OPTIONS}}
      </div>

      <div>
        <h2>Group Category:</h2>
        <select id="graph-type" name="grouping">
          {{GROUPING_OPTIONS}}
        </select>
      </div>

      <noscript><button class="button" type="submit">Show</button></noscript>
    </form>

    <section class="viewport">
      <div id="graph-wrapper" style="display: {{CHART_DISPLAY}}">
        <div id="chart"></div>
      </div>

      <div id="about-text" style="display: {{ABOUT_DISPLAY}}">
        <p>Thanks for visiting! This dashboard starts from the full time series of individual yellow cab trips
          from 2011 onward, published as parquet files. A huge thank you to the Taxi and Limousine Commission
          and NYC Open Data for maintaining these data and making them available for public use and analysis.</p>
        <p>You can access these files on the TLC's official site here: <a href="{{TLC_URL}}" target="_blank">TLC Trip Data</a></p>
        <p>The raw files were queried with DuckDB using conventional SQL to pull the relevant variables and
          summarize daily totals in revenue and mileage.</p>
        <p>The full dataset holds over a billion rows (over 100GB uncompressed), which is why the heavy lifting
          happens upstream and this page only reads the daily summary.</p>
        <p>Charts are drawn with Plotly.</p>
        <p>Code is available here: <a href="{{REPO_URL}}" target="_blank">GitHub Repo</a></p>
        <p>Thanks!</p>
      </div>

      <div class="footer">
        <a class="button primary" id="about-toggle-btn" href="{{TOGGLE_HREF}}">{{TOGGLE_LABEL}}</a>
        <a class="button" href="{{REPO_URL}}" target="_blank">GitHub Repo</a>
      </div>
    </section>
  </main>

  <script id="initial-state" type="application/json">{{STATE_JSON}}</script>
  <script id="initial-figure" type="application/json">{{FIGURE_JSON}}</script>
  <script>
    const subheadEl = document.getElementById('subhead-text');
    const graphWrapper = document.getElementById('graph-wrapper');
    const aboutEl = document.getElementById('about-text');
    const toggleBtn = document.getElementById('about-toggle-btn');
    const groupingEl = document.getElementById('graph-type');
    const seriesEls = Array.from(document.querySelectorAll('input[name="series"]'));

    let state = JSON.parse(document.getElementById('initial-state').textContent);
    let latestFigure = JSON.parse(document.getElementById('initial-figure').textContent);
    let drawnFigure = null;

    // Plotly cannot size a hidden div, so drawing waits until the chart is shown.
    const drawIfVisible = () => {
      if (graphWrapper.style.display === 'none' || latestFigure === drawnFigure) {
        return;
      }
      Plotly.react('chart', latestFigure.data, latestFigure.layout, { responsive: true });
      drawnFigure = latestFigure;
    };

    const syncUrl = () => {
      const params = new URLSearchParams({
        series: state.series,
        grouping: state.grouping,
        about: String(state.info_panel_visible)
      });
      window.history.replaceState(null, '', `/?${params}`);
    };

    const applyView = (view) => {
      state = view.state;
      subheadEl.innerHTML = view.subhead;
      graphWrapper.style.display = view.chart_visible ? 'block' : 'none';
      aboutEl.style.display = view.state.info_panel_visible ? 'block' : 'none';
      toggleBtn.textContent = view.toggle_label;
      if (view.figure) {
        latestFigure = view.figure;
      }
      drawIfVisible();
      syncUrl();
    };

    const post = async (event) => {
      const res = await fetch('/api/view', {
        method: 'POST',
        headers: { 'content-type': 'application/json' },
        body: JSON.stringify({ state, event })
      });
      if (!res.ok) {
        throw new Error(await res.text());
      }
      applyView(await res.json());
    };

    // Events run one at a time so each request starts from the state the previous reply left.
    let queue = Promise.resolve();
    const send = (event) => {
      const next = queue.then(() => post(event));
      queue = next.catch(() => {});
      return next;
    };

    seriesEls.forEach((input) => {
      input.addEventListener('change', () => {
        send({ type: 'select_series', value: input.value }).catch(console.error);
      });
    });

    groupingEl.addEventListener('change', () => {
      send({ type: 'select_grouping', value: groupingEl.value }).catch(console.error);
    });

    toggleBtn.addEventListener('click', (event) => {
      event.preventDefault();
      send({ type: 'toggle_info_panel' }).catch(console.error);
    });

    drawIfVisible();
  </script>
</body>
</html>
"#;
