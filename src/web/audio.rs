use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::{spawn_local, JsFuture};
use web_sys::js_sys::Promise;
use web_sys::{AddEventListenerOptions, Document, HtmlAudioElement, HtmlMediaElement};

use crate::config::AssetConfig;
use crate::presentation::{AudioPlayer, SoundClip};

/// 播放被拒绝（例如自动播放策略）时静默忽略。
fn swallow_rejection(promise: Promise, clip: SoundClip) {
    spawn_local(async move {
        if let Err(err) = JsFuture::from(promise).await {
            tracing::debug!(?clip, ?err, "audio playback rejected");
        }
    });
}

fn play_media(media: &HtmlMediaElement, clip: SoundClip) {
    match media.play() {
        Ok(promise) => swallow_rejection(promise, clip),
        Err(err) => tracing::debug!(?clip, ?err, "audio playback failed"),
    }
}

pub struct WebAudio {
    win: Option<HtmlAudioElement>,
    lose: Option<HtmlAudioElement>,
    bgm: Option<HtmlAudioElement>,
    bgm_volume: f64,
}

impl WebAudio {
    pub fn new(document: &Document, assets: &AssetConfig) -> Self {
        let load = |src: &str| match HtmlAudioElement::new_with_src(src) {
            Ok(audio) => Some(audio),
            Err(err) => {
                tracing::warn!(src, ?err, "failed to create audio element");
                None
            }
        };

        Self {
            win: load(&assets.win_sound),
            lose: load(&assets.lose_sound),
            bgm: document
                .get_element_by_id("bgm")
                .and_then(|element| element.dyn_into::<HtmlAudioElement>().ok()),
            bgm_volume: assets.bgm_volume,
        }
    }

    /// 启动背景音乐；若被浏览器拦截，则在第一次点击页面时重试一次。
    pub fn start_background(&self, document: &Document) {
        let Some(bgm) = self.bgm.clone() else {
            tracing::debug!("no #bgm element, background music disabled");
            return;
        };
        bgm.set_volume(self.bgm_volume);

        let promise = match bgm.play() {
            Ok(promise) => promise,
            Err(err) => {
                tracing::debug!(?err, "background music failed to start");
                return;
            }
        };

        let document = document.clone();
        spawn_local(async move {
            if JsFuture::from(promise).await.is_ok() {
                return;
            }
            tracing::debug!("background music blocked, retrying on first click");

            let retry = Closure::once_into_js(move || play_media(&bgm, SoundClip::Background));
            let options = AddEventListenerOptions::new();
            options.set_once(true);
            if let Err(err) = document.add_event_listener_with_callback_and_add_event_listener_options(
                "click",
                retry.unchecked_ref(),
                &options,
            ) {
                tracing::warn!(?err, "failed to register background music retry");
            }
        });
    }
}

impl AudioPlayer for WebAudio {
    fn play(&mut self, clip: SoundClip) {
        let element = match clip {
            SoundClip::Win => self.win.as_ref(),
            SoundClip::Lose => self.lose.as_ref(),
            SoundClip::Background => self.bgm.as_ref(),
        };
        let Some(element) = element else {
            return;
        };
        if !matches!(clip, SoundClip::Background) {
            element.set_current_time(0.0);
        }
        play_media(element, clip);
    }
}
