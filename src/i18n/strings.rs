/// Localized strings shown to players.
///
/// `welcome_first` carries a `%username%` placeholder.
#[derive(Debug, Clone)]
pub struct LanguageStrings {
    /// Hover hint on a translatable message
    pub translate_hover: &'static str,

    /// Prefix of messages sent by this service
    pub welcome_header: &'static str,

    pub welcome_first: &'static str,
    pub welcome_second: &'static str,
    pub welcome_third: &'static str,
}

impl LanguageStrings {
    /// Look up a string by its dotted key.
    pub fn get(&self, key: &str) -> Option<&'static str> {
        match key {
            "translate.hover" => Some(self.translate_hover),
            "welcome.header" => Some(self.welcome_header),
            "welcome.first" => Some(self.welcome_first),
            "welcome.second" => Some(self.welcome_second),
            "welcome.third" => Some(self.welcome_third),
            _ => None,
        }
    }
}

pub static ENGLISH_STRINGS: LanguageStrings = LanguageStrings {
    translate_hover: "Click to translate this message",
    welcome_header: "[Translate] ",
    welcome_first: "Welcome, %username%! Chat messages on this server can be translated.",
    welcome_second: "Click any chat message to translate it into your language.",
    welcome_third: "Your language was chosen from your location; use /language to change it.",
};

pub static CHINESE_STRINGS: LanguageStrings = LanguageStrings {
    translate_hover: "点击翻译此消息",
    welcome_header: "[翻译] ",
    welcome_first: "欢迎，%username%！本服务器的聊天消息可以翻译。",
    welcome_second: "点击任意聊天消息即可将其翻译成你的语言。",
    welcome_third: "你的语言已根据所在地区自动选择，可使用 /language 更改。",
};

pub static JAPANESE_STRINGS: LanguageStrings = LanguageStrings {
    translate_hover: "クリックしてこのメッセージを翻訳",
    welcome_header: "[翻訳] ",
    welcome_first: "ようこそ、%username%さん！このサーバーのチャットは翻訳できます。",
    welcome_second: "チャットメッセージをクリックすると、あなたの言語に翻訳されます。",
    welcome_third: "言語は地域から自動で選ばれました。/language で変更できます。",
};

pub static SPANISH_STRINGS: LanguageStrings = LanguageStrings {
    translate_hover: "Haz clic para traducir este mensaje",
    welcome_header: "[Traducir] ",
    welcome_first: "¡Bienvenido, %username%! Los mensajes del chat de este servidor se pueden traducir.",
    welcome_second: "Haz clic en cualquier mensaje del chat para traducirlo a tu idioma.",
    welcome_third: "Tu idioma se eligió según tu ubicación; usa /language para cambiarlo.",
};

pub static GERMAN_STRINGS: LanguageStrings = LanguageStrings {
    translate_hover: "Klicken, um diese Nachricht zu übersetzen",
    welcome_header: "[Übersetzen] ",
    welcome_first: "Willkommen, %username%! Chatnachrichten auf diesem Server können übersetzt werden.",
    welcome_second: "Klicke auf eine Chatnachricht, um sie in deine Sprache zu übersetzen.",
    welcome_third: "Deine Sprache wurde anhand deines Standorts gewählt; ändere sie mit /language.",
};

pub static FRENCH_STRINGS: LanguageStrings = LanguageStrings {
    translate_hover: "Cliquez pour traduire ce message",
    welcome_header: "[Traduire] ",
    welcome_first: "Bienvenue, %username% ! Les messages du chat de ce serveur peuvent être traduits.",
    welcome_second: "Cliquez sur un message du chat pour le traduire dans votre langue.",
    welcome_third: "Votre langue a été choisie selon votre position ; utilisez /language pour la changer.",
};
