use axum::response::Html;

pub async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

const INDEX_HTML: &str = r##"<!DOCTYPE html>
<html lang="ru">
<head>
<meta charset="UTF-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<title>Медицинская помощь с использованием мультимодального LLM</title>
<style>
  body { font-family: -apple-system, "Segoe UI", Roboto, sans-serif; max-width: 760px; margin: 40px auto; padding: 0 16px; color: #262730; }
  h1 { font-size: 1.8em; }
  details { border: 1px solid #ddd; border-radius: 6px; padding: 8px 12px; margin-bottom: 20px; }
  .preview { max-width: 100%; margin-top: 12px; border-radius: 6px; }
  .caption { color: #888; font-size: 0.85em; text-align: center; }
  button { padding: 8px 16px; border-radius: 6px; border: 1px solid #ccc; background: #fff; cursor: pointer; margin-top: 12px; }
  button:disabled { opacity: 0.5; cursor: wait; }
  .markup { line-height: 1.55; margin-top: 16px; }
  .info { background: #e8f1fb; color: #0b4f8a; padding: 12px; border-radius: 6px; margin-top: 20px; }
  .error { background: #fdecea; color: #9b1c1c; padding: 12px; border-radius: 6px; margin-top: 16px; }
  .hidden { display: none; }
</style>
</head>
<body>
<h1>Медицинская помощь с использованием мультимодального LLM</h1>

<details>
  <summary>Об этом приложении</summary>
  <p>Загрузите изображение, чтобы получить анализ от GPT-4.</p>
</details>

<label for="file">Загрузить изображение</label><br>
<input type="file" id="file" accept=".jpg,.jpeg,.png,image/jpeg,image/png">
<div id="preview-box" class="hidden">
  <img id="preview" class="preview" alt="Uploaded Image">
  <div class="caption">Uploaded Image</div>
</div>

<button id="analyze">Анализ изображения</button>

<div id="error" class="error hidden"></div>
<div id="result" class="markup"></div>

<div id="simplify-box" class="hidden">
  <div class="info">Ниже приведен вариант, который можно понять более простыми словами</div>
  <p>Объясни, как будто мне 5 лет</p>
  <label><input type="radio" name="simplify" value="No" checked> No</label>
  <label><input type="radio" name="simplify" value="Yes"> Yes</label>
  <div id="simplified" class="markup"></div>
</div>

<script>
let sessionId = null;

async function api(path, options) {
  const response = await fetch(path, options);
  const body = response.status === 204 ? null : await response.json();
  if (!response.ok) {
    throw new Error(body && body.error ? body.error : response.statusText);
  }
  return body;
}

function escapeHtml(text) {
  return text.replace(/&/g, "&amp;").replace(/</g, "&lt;").replace(/>/g, "&gt;");
}

function markup(text) {
  return escapeHtml(text)
    .split("\n")
    .map(line => {
      const heading = line.match(/^(#{1,4})\s+(.*)$/);
      if (heading) {
        const level = heading[1].length + 1;
        return `<h${level}>${heading[2]}</h${level}>`;
      }
      return line.replace(/\*\*(.+?)\*\*/g, "<strong>$1</strong>") + "<br>";
    })
    .join("");
}

function showError(message) {
  const box = document.getElementById("error");
  box.textContent = message;
  box.classList.toggle("hidden", !message);
}

function render(view) {
  document.getElementById("result").innerHTML = view.result ? markup(view.result) : "";
  document.getElementById("simplify-box").classList.toggle("hidden", !view.result);
  document.getElementById("simplified").innerHTML = view.simplified ? markup(view.simplified) : "";
  for (const radio of document.querySelectorAll("input[name=simplify]")) {
    radio.checked = (radio.value === "Yes") === view.simplify;
  }
}

async function withBusy(action) {
  const button = document.getElementById("analyze");
  button.disabled = true;
  showError("");
  try {
    await action();
  } catch (e) {
    showError(e.message);
  } finally {
    button.disabled = false;
  }
}

document.getElementById("file").addEventListener("change", event => {
  const file = event.target.files[0];
  if (!file) return;
  const reader = new FileReader();
  reader.onload = e => {
    document.getElementById("preview").src = e.target.result;
    document.getElementById("preview-box").classList.remove("hidden");
  };
  reader.readAsDataURL(file);

  const form = new FormData();
  form.append("file", file);
  withBusy(async () => {
    render(await api(`/api/sessions/${sessionId}/upload`, { method: "POST", body: form }));
  });
});

document.getElementById("analyze").addEventListener("click", () => {
  withBusy(async () => {
    render(await api(`/api/sessions/${sessionId}/analyze`, { method: "POST" }));
  });
});

for (const radio of document.querySelectorAll("input[name=simplify]")) {
  radio.addEventListener("change", () => {
    withBusy(async () => {
      render(await api(`/api/sessions/${sessionId}/simplify`, {
        method: "POST",
        headers: { "Content-Type": "application/json" },
        body: JSON.stringify({ simplify: radio.value === "Yes" }),
      }));
    });
  });
}

window.addEventListener("pagehide", () => {
  if (sessionId) {
    fetch(`/api/sessions/${sessionId}`, { method: "DELETE", keepalive: true });
  }
});

api("/api/sessions", { method: "POST" })
  .then(body => { sessionId = body.session_id; })
  .catch(e => showError(e.message));
</script>
</body>
</html>
"##;
