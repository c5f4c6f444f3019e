//! The static page shell.
//!
//! One embedded HTML document; everything dynamic arrives as server-rendered
//! fragments from the console routes. The script below is plumbing only:
//! fetch a fragment, place it, surface toast markers. All catalog knowledge
//! and rendering logic stays on the server side.

pub const SHELL_HTML: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width,initial-scale=1">
<title>opsdeck</title>
<style>
*{box-sizing:border-box;margin:0;padding:0}
:root{
  --bg:#0b1220;--panel:#0f1a2e;--card:#071127;--border:#1e2a44;
  --text:#e2e8f0;--dim:#9aa6b2;--accent:#60a5fa;
  --ok:#16a34a;--warn:#f59e0b;--bad:#ef4444;
}
body{background:var(--bg);color:var(--text);font-family:-apple-system,BlinkMacSystemFont,'Segoe UI',sans-serif;font-size:14px;height:100vh;display:flex;flex-direction:column}
#topbar{height:46px;background:var(--panel);border-bottom:1px solid var(--border);display:flex;align-items:center;gap:12px;padding:0 14px;flex-shrink:0}
#brand{font-weight:700;letter-spacing:.04em}
#status-summary{color:var(--dim);font-size:12px;margin-left:auto}
button{font:inherit;cursor:pointer}
#btn-toggle,#btn-refresh-status{background:none;border:1px solid var(--border);color:var(--dim);padding:4px 10px;border-radius:4px}
#btn-toggle:hover,#btn-refresh-status:hover{color:var(--text)}
#main{display:flex;flex:1;overflow:hidden}
#sidebar{width:250px;min-width:250px;background:var(--panel);border-right:1px solid var(--border);overflow-y:auto;padding:10px}
#sidebar.hidden{display:none}
#content{flex:1;overflow-y:auto;padding:16px}
.muted{color:var(--dim)}
.controller-block h3{font-size:12px;color:var(--dim);text-transform:uppercase;letter-spacing:.06em;margin:10px 0 6px}
.op-button{display:block;width:100%;text-align:left;background:none;border:none;color:var(--text);padding:7px 8px;border-radius:4px;margin-bottom:2px}
.op-button:hover{background:var(--card)}
.controller-category-header{display:flex;justify-content:space-between;width:100%;background:none;border:none;color:var(--text);font-weight:600;padding:8px;border-radius:4px}
.controller-category-header:hover{background:var(--card)}
.controller-category-inner{padding-left:6px}
#op-area h2{margin-bottom:6px}
.op-desc{color:var(--dim);margin-bottom:4px}
.op-meta{color:var(--dim);font-size:12px;font-family:monospace;margin-bottom:12px}
#op-form .field-label{display:block;margin-bottom:8px}
#op-form input[type=text],#op-form input:not([type]){width:100%;max-width:460px;background:var(--card);border:1px solid var(--border);color:var(--text);padding:8px;border-radius:4px}
.nmap-label{display:flex;align-items:center;gap:8px;color:var(--dim);margin-bottom:10px}
.op-submit{background:var(--accent);border:none;color:#06121f;font-weight:600;padding:8px 18px;border-radius:4px}
#op-result{margin-top:16px;display:none}
.response-meta{color:var(--dim);font-size:12px}
.response-error{color:#fca5a5;background:rgba(239,68,68,.08);border:1px solid rgba(239,68,68,.35);padding:10px;border-radius:6px}
.response-two-col{display:grid;grid-template-columns:1fr 1fr;gap:12px}
.panel{background:var(--card);border:1px solid var(--border);border-radius:8px;margin-bottom:10px}
.panel-head{display:flex;justify-content:space-between;align-items:center;gap:8px;padding:8px 10px;border-bottom:1px solid var(--border)}
.panel-body{padding:10px}
.panel.collapsed .panel-body{display:none}
.panel-toggle,.copy-json-btn,.host-toggle{background:none;border:1px solid var(--border);color:var(--dim);border-radius:4px;padding:2px 8px}
.raw-box pre{overflow-x:auto;font-size:12px;line-height:1.5}
.response-key{color:var(--accent)}
.response-list{margin-left:18px}
.response-row-block{margin-top:6px}
.card-grid{display:grid;grid-template-columns:repeat(auto-fit,minmax(180px,1fr));gap:12px}
.host-grid{display:grid;grid-template-columns:repeat(auto-fit,minmax(260px,1fr));gap:12px}
.port-card,.host-card{background:var(--card);padding:12px;border-radius:8px;border:1px solid var(--border);display:flex;justify-content:space-between;align-items:center}
.host-card{display:block}
.card-port{font-weight:700;font-size:18px}
.card-service,.card-product,.port-item-sub,.host-summary,.host-duration,.card-side-label{color:var(--dim);font-size:12px}
.card-identity{color:var(--dim);font-size:12px;font-family:monospace}
.card-methods{margin-top:6px;color:#cbd5e1;font-size:12px}
.card-vulns{margin-top:6px;color:#fca5a5;font-size:12px}
.card-side{display:flex;flex-direction:column;align-items:flex-end;gap:6px}
.badge{color:#fff;padding:4px 8px;border-radius:6px;font-weight:600;font-size:11px}
.badge-open{background:var(--ok)}
.badge-filtered{background:var(--warn)}
.badge-closed{background:var(--bad)}
.host-header{display:flex;justify-content:space-between;align-items:center}
.host-title{display:flex;align-items:center;gap:10px}
.host-name{font-weight:700}
.host-error{color:#fca5a5;margin-top:6px}
.host-body{margin-top:10px}
.host-card.collapsed .host-body{display:none}
.port-item{display:flex;justify-content:space-between;align-items:center;padding:6px 8px;border-radius:6px;background:#071827;margin-bottom:6px}
.port-item-title{font-weight:700}
.status-panel .panel-actions{margin-bottom:10px}
.status-flags{margin-bottom:10px}
.panel-updated{font-size:11px;margin-bottom:10px}
.flag.ok{color:var(--ok);font-weight:600}
.flag.bad{color:var(--bad);font-weight:600}
.worker-actions{display:flex;gap:8px;margin-bottom:10px}
.worker-actions button,#btn-status-refresh{background:var(--card);border:1px solid var(--border);color:var(--text);padding:6px 12px;border-radius:4px}
.worker-row{display:flex;align-items:center;gap:12px;background:var(--card);border:1px solid var(--border);border-radius:6px;padding:8px 10px;margin-bottom:6px}
.worker-name{flex:1;font-family:monospace}
.worker-state.on{color:var(--ok)}
.worker-state.off{color:var(--dim)}
.worker-toggle{background:none;border:1px solid var(--border);color:var(--text);padding:4px 12px;border-radius:4px}
.worker-toggle:disabled{opacity:.5;cursor:wait}
.response-box{background:var(--card);border:1px solid var(--border);border-radius:8px;padding:12px}
.response-box h1,.response-box h2,.response-box h3{margin:10px 0 6px}
.response-box p,.response-box ul,.response-box pre{margin-bottom:8px}
.discarded{font-style:italic}
.toast{position:fixed;bottom:18px;right:18px;background:#111c31;border:1px solid var(--border);color:var(--text);padding:10px 16px;border-radius:6px;opacity:0;transition:opacity .2s;z-index:500}
.toast.show{opacity:1}
</style>
</head>
<body>
<div id="topbar">
  <button id="btn-toggle" type="button">&#171;</button>
  <div id="brand">opsdeck</div>
  <button id="btn-refresh-status" type="button" style="display:none"></button>
  <div id="status-summary" class="muted">Status unknown</div>
</div>
<div id="main">
  <aside id="sidebar"><div id="controllers-list" class="muted">Loading catalog...</div></aside>
  <section id="content">
    <div id="op-area"><div class="muted">Pick an operation from the catalog.</div></div>
    <div id="op-result"></div>
  </section>
</div>
<script>
(function () {
  var sidebar = document.getElementById('sidebar');
  var controllersList = document.getElementById('controllers-list');
  var opArea = document.getElementById('op-area');
  var opResult = document.getElementById('op-result');
  var statusSummary = document.getElementById('status-summary');
  var currentOp = null;

  function showToast(msg, ms) {
    var t = document.createElement('div');
    t.className = 'toast';
    t.textContent = msg;
    document.body.appendChild(t);
    void t.offsetWidth;
    t.classList.add('show');
    setTimeout(function () {
      t.classList.remove('show');
      setTimeout(function () { t.remove(); }, 200);
    }, ms || 1800);
  }

  function drainToasts(root) {
    root.querySelectorAll('.toast-note').forEach(function (note) {
      if (note.dataset.toast) showToast(note.dataset.toast);
      note.remove();
    });
  }

  function place(container, html) {
    container.innerHTML = html;
    drainToasts(container);
  }

  async function fragment(path, options) {
    var resp = await fetch(path, options);
    return resp.text();
  }

  async function loadCatalog() {
    try {
      place(controllersList, await fragment('/console/catalog'));
    } catch (e) {
      controllersList.innerHTML = '<div class="muted">Catalog unavailable</div>';
    }
  }

  async function loadSummary() {
    try {
      statusSummary.innerHTML = await fragment('/console/status/summary');
    } catch (e) { /* keep the stale line */ }
  }

  async function refreshPanel(force) {
    if (!opArea.querySelector('.status-panel')) return;
    var path = force ? '/console/status/panel?refresh=true' : '/console/status/panel';
    try {
      place(opArea, await fragment(path));
      loadSummary();
    } catch (e) { /* panel keeps its last render */ }
  }

  async function openOperation(id) {
    currentOp = id;
    opResult.style.display = 'none';
    opResult.innerHTML = '';
    try {
      place(opArea, await fragment('/console/ops/' + encodeURIComponent(id) + '/form'));
    } catch (e) {
      opArea.innerHTML = '<div class="response-error">Error loading operation</div>';
    }
  }

  async function submitOperation(form) {
    var id = form.dataset.op;
    opResult.style.display = 'block';
    opResult.innerHTML = '<div class="response-meta">Loading...</div>';
    try {
      var body = new URLSearchParams(new FormData(form));
      var html = await fragment('/console/ops/' + encodeURIComponent(id) + '/dispatch', {
        method: 'POST',
        headers: { 'Content-Type': 'application/x-www-form-urlencoded' },
        body: body
      });
      if (currentOp !== id) return;
      place(opResult, html);
    } catch (e) {
      opResult.innerHTML = '<div class="response-error">Error: request failed</div>';
    }
    loadSummary();
  }

  async function toggleWorker(btn) {
    var name = btn.dataset.worker;
    btn.disabled = true;
    try {
      var html = await fragment('/console/workers/' + encodeURIComponent(name), {
        method: 'POST',
        headers: { 'Content-Type': 'application/x-www-form-urlencoded' },
        body: 'desired=' + btn.dataset.desired
      });
      var tpl = document.createElement('template');
      tpl.innerHTML = html;
      drainToasts(tpl.content);
      var row = tpl.content.querySelector('.worker-row');
      var old = btn.closest('.worker-row');
      if (row && old) { old.replaceWith(row); } else { btn.disabled = false; }
      setTimeout(function () { refreshPanel(false); }, 600);
    } catch (e) {
      btn.disabled = false;
      showToast('toggle failed: network error');
    }
  }

  async function bulkToggle(enable) {
    try {
      var html = await fragment('/console/workers', {
        method: 'POST',
        headers: { 'Content-Type': 'application/x-www-form-urlencoded' },
        body: 'enable=' + enable
      });
      var tpl = document.createElement('template');
      tpl.innerHTML = html;
      drainToasts(tpl.content);
      setTimeout(function () { refreshPanel(false); }, 700);
    } catch (e) {
      showToast('bulk toggle failed: network error');
    }
  }

  document.getElementById('btn-toggle').addEventListener('click', function () {
    sidebar.classList.toggle('hidden');
  });

  sidebar.addEventListener('click', function (e) {
    var header = e.target.closest('.controller-category-header');
    if (header) {
      var inner = header.nextElementSibling;
      if (inner) inner.style.display = inner.style.display === 'none' ? '' : 'none';
      return;
    }
    var op = e.target.closest('.op-button');
    if (op) openOperation(op.dataset.op);
  });

  opArea.addEventListener('submit', function (e) {
    var form = e.target.closest('#op-form');
    if (!form) return;
    e.preventDefault();
    submitOperation(form);
  });

  opArea.addEventListener('click', function (e) {
    var toggle = e.target.closest('.worker-toggle');
    if (toggle) { toggleWorker(toggle); return; }
    if (e.target.closest('#btn-start-all')) { bulkToggle(true); return; }
    if (e.target.closest('#btn-stop-all')) { bulkToggle(false); return; }
    if (e.target.closest('#btn-status-refresh')) { refreshPanel(true); return; }
  });

  opResult.addEventListener('click', function (e) {
    var panelToggle = e.target.closest('.panel-toggle');
    if (panelToggle) {
      var panel = panelToggle.closest('.panel');
      if (panel) {
        var collapsed = panel.classList.toggle('collapsed');
        panelToggle.innerHTML = collapsed ? '&#9656;' : '&#9662;';
      }
      return;
    }
    var copyBtn = e.target.closest('.copy-json-btn');
    if (copyBtn) {
      var box = copyBtn.closest('.panel');
      var pre = box && box.querySelector('.raw-box pre');
      if (pre && navigator.clipboard && navigator.clipboard.writeText) {
        navigator.clipboard.writeText(pre.textContent).then(
          function () { showToast('JSON copied'); },
          function () { showToast('Copy failed'); }
        );
      }
      return;
    }
    var hostToggle = e.target.closest('.host-toggle');
    if (hostToggle) {
      var card = hostToggle.closest('.host-card');
      if (card) {
        var hidden = card.classList.toggle('collapsed');
        hostToggle.setAttribute('aria-expanded', hidden ? 'false' : 'true');
        hostToggle.innerHTML = hidden ? '&#9656;' : '&#9662;';
      }
    }
  });

  loadCatalog();
  loadSummary();
  // refreshPanel chains loadSummary, so one timer keeps both current.
  setInterval(function () {
    if (opArea.querySelector('.status-panel')) { refreshPanel(false); } else { loadSummary(); }
  }, 10000);
})();
</script>
</body>
</html>
"##;
