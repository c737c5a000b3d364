// 以 format! 組出 HTML 頁面，使用者與目錄文字一律先經 escape_html

use crate::core::{CropAdvisory, Prediction, RiskLevel};

pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn layout(title: &str, body: &str) -> String {
    format!(
        r##"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title} | Pest Predictor</title>
<style>
body{{margin:0;font-family:-apple-system,BlinkMacSystemFont,'Segoe UI',Roboto,sans-serif;background:#f7f7f2;color:#1f2a1f}}
nav{{background:#2f5d34;padding:12px 24px}}
nav a{{color:#fff;margin-right:18px;text-decoration:none;font-weight:600}}
main{{max-width:760px;margin:32px auto;padding:0 20px}}
.card{{background:#fff;border-radius:12px;box-shadow:0 2px 12px rgba(0,0,0,.06);padding:24px;margin-bottom:20px}}
label{{display:block;margin:12px 0 4px;font-weight:600}}
input,select{{width:100%;padding:10px;border:1px solid #cfd8cf;border-radius:8px;font-size:1rem}}
button{{margin-top:20px;padding:12px 20px;border:none;border-radius:8px;background:#2f5d34;color:#fff;font-size:1rem;cursor:pointer}}
.risk-high{{color:#b42318}}
.risk-low{{color:#2f7d32}}
table{{border-collapse:collapse;width:100%}}
td,th{{border-bottom:1px solid #e4e9e4;padding:8px;text-align:left}}
</style>
</head>
<body>
<nav><a href="/">Home</a><a href="/predictor">Predictor</a><a href="/questionnaire">Questionnaire</a><a href="/waitlist">Waitlist</a></nav>
<main>
{body}
</main>
</body>
</html>
"##,
        title = escape_html(title),
        body = body
    )
}

pub fn render_index() -> String {
    layout(
        "Home",
        r#"<div class="card">
<h1>Know your pest risk before it hits your field</h1>
<p>Enter today's weather and soil readings for your crop and get an estimate of how likely a pest infestation is, together with advice for each growth stage.</p>
<p><a href="/predictor">Start a prediction</a></p>
</div>"#,
    )
}

pub fn render_predictor(known_crops: &[String]) -> String {
    let options: String = known_crops
        .iter()
        .map(|crop| {
            let crop = escape_html(crop);
            format!(r#"<option value="{crop}">{crop}</option>"#)
        })
        .collect::<Vec<_>>()
        .join("\n");

    let body = format!(
        r#"<div class="card">
<h1>Pest risk predictor</h1>
<form method="post" action="/predict">
<label for="crop_type">Crop type</label>
<select id="crop_type" name="crop_type" required>
{options}
</select>
<label for="date">Date</label>
<input id="date" name="date" type="date" required>
<label for="temperature">Temperature (&deg;C)</label>
<input id="temperature" name="temperature" type="number" step="any" required>
<label for="humidity">Humidity (%)</label>
<input id="humidity" name="humidity" type="number" step="any" min="0" max="100" required>
<label for="rainfall">Rainfall (mm)</label>
<input id="rainfall" name="rainfall" type="number" step="any" required>
<label for="wind_speed">Wind speed (km/h)</label>
<input id="wind_speed" name="wind_speed" type="number" step="any" required>
<label for="soil_moisture">Soil moisture (%)</label>
<input id="soil_moisture" name="soil_moisture" type="number" step="any" required>
<button type="submit">Predict</button>
</form>
</div>"#
    );
    layout("Predictor", &body)
}

pub fn render_questionnaire() -> String {
    layout(
        "Questionnaire",
        r#"<div class="card">
<h1>Farmer questionnaire</h1>
<p>Help us improve our predictions by telling us about your farm.</p>
<ol>
<li>Which crops do you grow, and on how many acres?</li>
<li>Which pests have affected your crops in the last two seasons?</li>
<li>How do you currently monitor weather on your farm?</li>
<li>Which pest control methods do you use today?</li>
<li>How would you like to receive alerts (SMS, app, email)?</li>
</ol>
</div>"#,
    )
}

pub fn render_waitlist() -> String {
    layout(
        "Waitlist",
        r#"<div class="card">
<h1>Join the waitlist</h1>
<p>Field sensors and automatic daily alerts are coming soon. Leave your details with your local extension officer to be among the first to try them.</p>
</div>"#,
    )
}

fn render_advisory(advisory: &CropAdvisory) -> String {
    let pests: String = advisory
        .pests
        .iter()
        .map(|p| format!("<li>{}</li>", escape_html(p)))
        .collect();

    let mut html = format!("<h2>Likely pests</h2>\n<ol>{pests}</ol>\n");
    for section in &advisory.sections {
        html.push_str(&format!("<h2>{}</h2>\n<dl>\n", escape_html(&section.title)));
        for entry in &section.entries {
            html.push_str(&format!(
                "<dt>{}</dt><dd>{}</dd>\n",
                escape_html(&entry.label),
                escape_html(&entry.text)
            ));
        }
        html.push_str("</dl>\n");
    }
    html
}

pub fn render_result(prediction: &Prediction) -> String {
    let input = &prediction.input;
    let risk_class = match prediction.risk {
        RiskLevel::High => "risk-high",
        RiskLevel::Low => "risk-low",
    };

    let advice = match (&prediction.risk, &prediction.advisory) {
        (RiskLevel::High, Some(advisory)) => render_advisory(advisory),
        (RiskLevel::High, None) => {
            "<p>No crop-specific advice is available yet for this crop.</p>".to_string()
        }
        (RiskLevel::Low, _) => "<p>No action needed right now. Keep monitoring your field.</p>".to_string(),
    };

    let body = format!(
        r#"<div class="card">
<h1>Pest infestation risk: <span class="{risk_class}">{risk}</span></h1>
<p>Pest likelihood: <strong>{likelihood:.2}%</strong></p>
{advice}
</div>
<div class="card">
<h2>Your input</h2>
<table>
<tr><th>date</th><th>temperature</th><th>humidity</th><th>rainfall</th><th>wind_speed</th><th>crop_type</th><th>soil_moisture</th></tr>
<tr><td>{date}</td><td>{temperature}</td><td>{humidity}</td><td>{rainfall}</td><td>{wind_speed}</td><td>{crop}</td><td>{soil_moisture}</td></tr>
</table>
<p><a href="/predictor">Make another prediction</a></p>
</div>"#,
        risk = prediction.risk,
        likelihood = prediction.likelihood,
        date = input.date,
        temperature = input.temperature,
        humidity = input.humidity,
        rainfall = input.rainfall,
        wind_speed = input.wind_speed,
        crop = escape_html(&input.crop_type),
        soil_moisture = input.soil_moisture,
    );
    layout("Result", &body)
}

pub fn render_error(message: &str, suggestion: &str) -> String {
    let body = format!(
        r#"<div class="card">
<h1>Something went wrong</h1>
<p>{}</p>
<p>{}</p>
<p><a href="/predictor">Back to the predictor</a></p>
</div>"#,
        escape_html(message),
        escape_html(suggestion)
    );
    layout("Error", &body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::advisory::AdvisoryCatalog;
    use crate::core::FeatureRecord;
    use chrono::NaiveDate;

    fn prediction(risk: RiskLevel, likelihood: f64, crop: &str) -> Prediction {
        Prediction {
            likelihood,
            risk,
            advisory: AdvisoryCatalog::builtin().lookup(crop).cloned(),
            input: FeatureRecord {
                crop_type: crop.to_string(),
                date: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
                temperature: 30.0,
                humidity: 80.0,
                rainfall: 10.0,
                wind_speed: 2.0,
                soil_moisture: 40.0,
            },
        }
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<script>alert("x&y")</script>"#),
            "&lt;script&gt;alert(&quot;x&amp;y&quot;)&lt;/script&gt;"
        );
        assert_eq!(escape_html("it's"), "it&#39;s");
    }

    #[test]
    fn test_result_page_high() {
        let html = render_result(&prediction(RiskLevel::High, 87.0, "maize"));
        assert!(html.contains("HIGH"));
        assert!(html.contains("87.00%"));
        assert!(html.contains("Armyworms"));
        assert!(html.contains("Procedures"));
        assert!(html.contains("2024-05-01"));
    }

    #[test]
    fn test_result_page_low_omits_advice() {
        let mut low = prediction(RiskLevel::Low, 12.5, "maize");
        low.advisory = None;
        let html = render_result(&low);
        assert!(html.contains("LOW"));
        assert!(html.contains("12.50%"));
        assert!(!html.contains("Armyworms"));
    }

    #[test]
    fn test_user_text_is_escaped() {
        let html = render_result(&prediction(RiskLevel::High, 70.0, "<b>maize</b>"));
        assert!(html.contains("&lt;b&gt;maize&lt;/b&gt;"));
        assert!(!html.contains("<b>maize</b>"));
    }

    #[test]
    fn test_predictor_lists_crops() {
        let html = render_predictor(&["beans".to_string(), "maize".to_string()]);
        assert!(html.contains(r#"<option value="beans">beans</option>"#));
        assert!(html.contains(r#"action="/predict""#));
        assert!(html.contains(r#"name="soil_moisture""#));
    }
}
