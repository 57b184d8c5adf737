//! The course catalog: validation plus the built-in eight-level Web3 course
//! that guarantees the app is useful without external config.

use std::collections::HashSet;

use crate::domain::{Level, LessonPart, QuizQuestion};

/// Validated, ordered collection of levels. Read-only after construction.
pub struct Catalog {
  levels: Vec<Level>,
}

impl Catalog {
  /// Validate and wrap a level list. Rules:
  /// - at least one level, ids contiguous starting at 1;
  /// - every level has lessons, a non-empty quiz bank and a positive reward;
  /// - every question is well-formed and question ids are unique.
  pub fn new(levels: Vec<Level>) -> Result<Self, String> {
    if levels.is_empty() {
      return Err("catalog is empty".into());
    }
    let mut question_ids = HashSet::new();
    for (i, level) in levels.iter().enumerate() {
      let expected = i as u32 + 1;
      if level.id != expected {
        return Err(format!(
          "level ids must be contiguous from 1: found {} at position {}",
          level.id, expected
        ));
      }
      if level.lessons.is_empty() {
        return Err(format!("level {} has no lessons", level.id));
      }
      if level.quiz.is_empty() {
        return Err(format!("level {} has an empty quiz bank", level.id));
      }
      if level.xp_reward == 0 {
        return Err(format!("level {} has a zero xp reward", level.id));
      }
      for q in &level.quiz {
        if !q.is_well_formed() {
          return Err(format!("level {} question '{}' is malformed", level.id, q.id));
        }
        if !question_ids.insert(q.id.clone()) {
          return Err(format!("duplicate question id '{}'", q.id));
        }
      }
    }
    Ok(Self { levels })
  }

  pub fn levels(&self) -> &[Level] {
    &self.levels
  }

  pub fn get(&self, id: u32) -> Option<&Level> {
    self.levels.iter().find(|l| l.id == id)
  }

  pub fn len(&self) -> usize {
    self.levels.len()
  }

  /// Id of the final level; completing it makes the certificate available.
  pub fn last_id(&self) -> u32 {
    self.levels.last().map(|l| l.id).unwrap_or(0)
  }
}

fn lesson(title: &str, content: &str) -> LessonPart {
  LessonPart { title: title.into(), content: content.into(), image: None }
}

fn q(id: &str, question: &str, options: [&str; 4], correct: usize, explanation: &str) -> QuizQuestion {
  QuizQuestion {
    id: id.into(),
    question: question.into(),
    options: options.iter().map(|o| o.to_string()).collect(),
    correct_answer_index: correct,
    explanation: explanation.into(),
  }
}

/// The built-in course. Only the first level starts unlocked; the rest are
/// gated by completing the previous one.
pub fn builtin_levels() -> Vec<Level> {
  vec![
    Level {
      id: 1,
      title: "Основы блокчейна".into(),
      description: "Что такое распределённый реестр, блоки, хэши и почему это работает без посредников.".into(),
      icon: "⛓️".into(),
      color: "from-cyan-500 to-blue-600".into(),
      lessons: vec![
        lesson(
          "Что такое блокчейн",
          "**Блокчейн** — это распределённый реестр: цепочка блоков, где каждый блок содержит транзакции и хэш предыдущего блока.\n* Данные нельзя незаметно изменить — изменится хэш.\n* Копию реестра хранят тысячи узлов.\n> Доверие обеспечивает математика, а не посредник.",
        ),
        lesson(
          "Консенсус",
          "Сеть должна договориться, какой блок следующий. Для этого существуют механизмы консенсуса:\n* **Proof of Work** — майнеры тратят вычисления.\n* **Proof of Stake** — валидаторы блокируют стейк и рискуют им.\nНечестный участник теряет либо электричество, либо стейк.",
        ),
        lesson(
          "Децентрализация",
          "Чем больше независимых узлов, тем труднее атаковать сеть. Классическая угроза — **атака 51%**: контроль над большинством голосующей мощности позволяет переписывать историю, но стоит дороже, чем приносит.",
        ),
      ],
      quiz: vec![
        q(
          "l1q1",
          "Что связывает блоки в цепочку?",
          ["Номер блока", "Хэш предыдущего блока", "Подпись майнера", "Метка времени"],
          1,
          "Каждый блок содержит хэш предыдущего, поэтому подмена старого блока ломает всю цепочку после него.",
        ),
        q(
          "l1q2",
          "Чем Proof of Stake отличается от Proof of Work?",
          [
            "PoS быстрее печатает блоки",
            "В PoS право на блок даёт заблокированный стейк, а не вычисления",
            "PoS не требует узлов",
            "PoW используется только в тестнетах",
          ],
          1,
          "В PoS валидатор ставит на кон собственные средства вместо вычислительной мощности.",
        ),
        q(
          "l1q3",
          "Почему атака 51% обычно невыгодна?",
          [
            "Её невозможно выполнить технически",
            "Сеть автоматически банит атакующего",
            "Стоимость контроля над большинством превышает возможную выгоду",
            "Биржи возвращают украденные средства",
          ],
          2,
          "Захват большинства мощности или стейка стоит огромных денег, а успешная атака обесценивает сам актив.",
        ),
      ],
      xp_reward: 100,
      is_locked: false,
    },
    Level {
      id: 2,
      title: "Криптовалюты и кошельки".into(),
      description: "Приватные ключи, seed-фразы, виды кошельков и как не потерять свои средства.".into(),
      icon: "👛".into(),
      color: "from-emerald-500 to-teal-600".into(),
      lessons: vec![
        lesson(
          "Ключи и адреса",
          "Кошелёк — это пара ключей.\n* **Приватный ключ** подписывает транзакции. Тот, кто им владеет, владеет средствами.\n* **Публичный адрес** можно показывать кому угодно.\n> Not your keys — not your coins.",
        ),
        lesson(
          "Seed-фраза",
          "**Seed-фраза** (12–24 слова) — мастер-ключ, из которого выводятся все приватные ключи кошелька.\n* Записывается офлайн, на бумаге или металле.\n* Никогда не вводится на сайтах и не отправляется «в поддержку».",
        ),
        lesson(
          "Горячие и холодные кошельки",
          "Горячий кошелёк подключён к интернету и удобен для мелких сумм. Холодный (аппаратный) хранит ключи офлайн и подписывает транзакции внутри устройства — основной выбор для долгосрочного хранения.",
        ),
      ],
      quiz: vec![
        q(
          "l2q1",
          "Что даёт контроль над средствами на адресе?",
          ["Публичный адрес", "Приватный ключ", "Логин от биржи", "Номер блока"],
          1,
          "Транзакцию может подписать только владелец приватного ключа.",
        ),
        q(
          "l2q2",
          "«Поддержка проекта» просит вашу seed-фразу для «верификации». Ваши действия?",
          [
            "Отправить, если сайт выглядит официально",
            "Отправить первые шесть слов",
            "Отказать: seed-фразу не запрашивает никто и никогда",
            "Сначала перевести средства на биржу",
          ],
          2,
          "Запрос seed-фразы — всегда мошенничество. Фраза вводится только в сам кошелёк при восстановлении.",
        ),
        q(
          "l2q3",
          "Для чего подходит аппаратный кошелёк?",
          [
            "Для высокочастотного трейдинга",
            "Для долгосрочного хранения значительных сумм",
            "Только для NFT",
            "Для майнинга",
          ],
          1,
          "Ключи не покидают устройство, поэтому холодное хранение устойчиво к заражённому компьютеру.",
        ),
      ],
      xp_reward: 120,
      is_locked: true,
    },
    Level {
      id: 3,
      title: "Ноды и валидаторы".into(),
      description: "Зачем сети узлы, как работает валидатор и что такое слэшинг.".into(),
      icon: "🖥️".into(),
      color: "from-blue-500 to-indigo-600".into(),
      lessons: vec![
        lesson(
          "Типы узлов",
          "* **Полный узел** хранит и проверяет всю цепочку.\n* **Лёгкий клиент** доверяет заголовкам блоков.\n* **Архивный узел** дополнительно хранит все исторические состояния.\nЧем больше полных узлов, тем честнее сеть.",
        ),
        lesson(
          "Работа валидатора",
          "Валидатор в PoS-сети предлагает и подтверждает блоки. За честную работу он получает награды, за простой — недополучает, а за двойную подпись его стейк **слэшится** (частично сжигается).",
        ),
        lesson(
          "Эксплуатация ноды",
          "Нода — это сервер: мониторинг, диски, обновления клиента, резервный канал.\n* Пропущенные апдейты — пропущенные блоки.\n* Дублирование ключа валидатора на двух машинах — прямой путь к слэшингу.",
        ),
      ],
      quiz: vec![
        q(
          "l3q1",
          "Чем полный узел отличается от лёгкого клиента?",
          [
            "Полный узел проверяет все правила сети самостоятельно",
            "Полный узел работает только у майнеров",
            "Лёгкий клиент хранит больше данных",
            "Разницы нет",
          ],
          0,
          "Лёгкий клиент доверяет чужим проверкам, полный узел проверяет каждый блок сам.",
        ),
        q(
          "l3q2",
          "Ваш валидатор упал на сутки. Что произойдёт?",
          [
            "Стейк будет полностью сожжён",
            "Ничего",
            "Вы недополучите награды, а сеть продолжит работу",
            "Сеть остановится",
          ],
          2,
          "Простой наказывается потерянными наградами; слэшинг назначают за злонамеренные действия вроде двойной подписи.",
        ),
        q(
          "l3q3",
          "Почему нельзя запускать один ключ валидатора на двух серверах «для надёжности»?",
          [
            "Это удвоит комиссию",
            "Два сервера подпишут конфликтующие блоки, и стейк слэшится",
            "Клиент не запустится",
            "Награды будут делиться пополам",
          ],
          1,
          "Двойная подпись — главное слэшинг-нарушение: сеть воспринимает её как атаку.",
        ),
      ],
      xp_reward: 150,
      is_locked: true,
    },
    Level {
      id: 4,
      title: "Смарт-контракты".into(),
      description: "Код вместо посредника: EVM, газ, и почему «code is law» требует аудита.".into(),
      icon: "📜".into(),
      color: "from-purple-500 to-fuchsia-600".into(),
      lessons: vec![
        lesson(
          "Что такое смарт-контракт",
          "**Смарт-контракт** — программа, развёрнутая в блокчейне. Её код открыт, исполнение детерминировано, а результат проверяет каждый узел.\n> После деплоя контракт нельзя «подправить» — только мигрировать на новый.",
        ),
        lesson(
          "Газ",
          "Каждая операция стоит **газ** — плату за вычисления сети.\n* Сложный вызов = больше газа.\n* Лимит газа защищает сеть от бесконечных циклов.\nНеудачная транзакция газ всё равно расходует.",
        ),
        lesson(
          "Уязвимости",
          "Классика атак: **reentrancy** (повторный вход до обновления баланса), переполнения, манипуляция оракулами. Поэтому серьёзные контракты проходят независимый аудит и покрываются тестами.",
        ),
      ],
      quiz: vec![
        q(
          "l4q1",
          "Что происходит с контрактом после деплоя?",
          [
            "Автор может менять код по желанию",
            "Код зафиксирован; изменения требуют новой версии или заранее заложенного механизма обновления",
            "Код виден только автору",
            "Контракт живёт 30 дней",
          ],
          1,
          "Иммутабельность — основа доверия: правила нельзя переписать задним числом.",
        ),
        q(
          "l4q2",
          "Транзакция упала с ошибкой. Газ вернётся?",
          [
            "Да, полностью",
            "Нет: выполненные вычисления уже оплачены",
            "Вернётся половина",
            "Газ возвращает автор контракта",
          ],
          1,
          "Узлы уже потратили ресурсы на исполнение до точки отказа, эта работа оплачивается.",
        ),
        q(
          "l4q3",
          "Контракт переводит средства до обновления внутреннего баланса. Какой атакой это грозит?",
          ["Фишинг", "Reentrancy", "Атака 51%", "Сибилла"],
          1,
          "Злоумышленник повторно входит в функцию вывода, пока баланс ещё не списан, и опустошает контракт.",
        ),
      ],
      xp_reward: 180,
      is_locked: true,
    },
    Level {
      id: 5,
      title: "DeFi: децентрализованные финансы".into(),
      description: "DEX, пулы ликвидности, стейкинг, доходность и связанные с ней риски.".into(),
      icon: "💧".into(),
      color: "from-sky-500 to-cyan-600".into(),
      lessons: vec![
        lesson(
          "DEX и AMM",
          "Децентрализованная биржа (**DEX**) сводит сделки без кастодиана. Вместо стакана заявок — **AMM**: пул из двух активов, цена определяется их соотношением по формуле x·y=k.",
        ),
        lesson(
          "Пулы ликвидности",
          "Поставщик ликвидности кладёт в пул оба актива и зарабатывает на комиссиях.\n* Риск: **impermanent loss** — при сильном движении цены выгоднее было просто держать активы.\n* Риск: баг в контракте пула.",
        ),
        lesson(
          "Доходность и риск",
          "Аномально высокий APY — это всегда оплата риска: новый непроверенный контракт, токен-пустышка в паре или пирамида эмиссии. Правило: понимай, откуда берётся доход, прежде чем вносить средства.",
        ),
      ],
      quiz: vec![
        q(
          "l5q1",
          "Откуда берётся цена в AMM-пуле?",
          [
            "Её устанавливает команда проекта",
            "Из соотношения резервов пула",
            "Из среднего по централизованным биржам",
            "Голосованием держателей",
          ],
          1,
          "Формула x·y=k выводит цену из текущих резервов; сделки сдвигают соотношение и цену.",
        ),
        q(
          "l5q2",
          "Что такое impermanent loss?",
          [
            "Комиссия сети за вывод из пула",
            "Потеря пароля от кошелька",
            "Недополученная стоимость относительно простого удержания активов при движении цены",
            "Сгоревший газ",
          ],
          2,
          "При расхождении цен активов пул ребалансируется против поставщика ликвидности.",
        ),
        q(
          "l5q3",
          "Протокол обещает 900% APY на стейблкоинах. Ваши действия?",
          [
            "Внести всё: стейблкоины не падают",
            "Разобраться, чем оплачена доходность, и считать протокол высокорисковым",
            "Внести половину",
            "Сообщить в банк",
          ],
          1,
          "Доходность выше рынка всегда оплачена чьим-то риском — чаще всего риском вкладчика.",
        ),
      ],
      xp_reward: 200,
      is_locked: true,
    },
    Level {
      id: 6,
      title: "Безопасность в Web3".into(),
      description: "Фишинг, поддельные подписи, approve-дрейнеры и гигиена операций.".into(),
      icon: "🛡️".into(),
      color: "from-red-500 to-orange-600".into(),
      lessons: vec![
        lesson(
          "Фишинг",
          "Основной вектор атак — не взлом криптографии, а обман человека: поддельные сайты, «саппорт» в личке, airdrop-приманки.\n* Адрес сайта проверяется по закладке, не по ссылке из чата.\n* Срочность — признак скама.",
        ),
        lesson(
          "Опасные подписи",
          "Подпись транзакции может делать больше, чем кажется.\n* **approve** на неограниченную сумму отдаёт контракту право тратить ваш токен.\n* Слепая подпись сообщения может авторизовать перевод.\nЧитай, что подписываешь, и отзывай старые разрешения.",
        ),
        lesson(
          "Гигиена операций",
          "Разделяй кошельки: горячий для экспериментов, холодный для хранения. Тестовая транзакция перед крупным переводом, менеджер паролей и 2FA без SMS — базовый минимум.",
        ),
      ],
      quiz: vec![
        q(
          "l6q1",
          "В личные сообщения пишет «поддержка» биржи и просит срочно подтвердить кошелёк по ссылке. Что делать?",
          [
            "Перейти и подтвердить, пока аккаунт не заблокировали",
            "Игнорировать и сообщить о спаме: поддержка не пишет первой",
            "Отправить им скриншот кошелька",
            "Спросить у них официальный домен",
          ],
          1,
          "Сценарий «срочно подтвердите» — классический фишинг; настоящая поддержка не инициирует переписку.",
        ),
        q(
          "l6q2",
          "Чем опасен безлимитный approve для неизвестного контракта?",
          [
            "Ничем, это стандарт",
            "Контракт сможет вывести весь одобренный токен в любой момент",
            "Вырастет комиссия сети",
            "Кошелёк перестанет открываться",
          ],
          1,
          "Approve — это право тратить ваши токены; дрейнеры пользуются именно забытыми разрешениями.",
        ),
        q(
          "l6q3",
          "Перед переводом крупной суммы на новый адрес стоит…",
          [
            "Отправить всё одной транзакцией, чтобы сэкономить газ",
            "Сделать маленькую тестовую транзакцию и сверить адрес",
            "Отключить интернет",
            "Попросить получателя прислать seed-фразу",
          ],
          1,
          "Тестовый перевод стоит копейки и страхует от опечатки или подмены адреса буфером обмена.",
        ),
      ],
      xp_reward: 220,
      is_locked: true,
    },
    Level {
      id: 7,
      title: "Тестнеты и амбассадорство".into(),
      description: "Как участвовать в тестовых сетях, зачем проектам комьюнити и как попасть в ранние программы.".into(),
      icon: "🧪".into(),
      color: "from-lime-500 to-emerald-600".into(),
      lessons: vec![
        lesson(
          "Зачем нужны тестнеты",
          "**Тестнет** — копия сети с бесценными токенами, где проект обкатывает обновления, а участники — инфраструктуру.\n* Ошибки здесь ничего не стоят.\n* Активные тестнетчики часто получают ранний доступ и награды в майннете.",
        ),
        lesson(
          "Участие в тестнете",
          "Типичный цикл: развернуть ноду по документации, держать аптайм, выполнять задания (транзакции, отчёты о багах), отчитываться в форме проекта. Ценится стабильность и внятные баг-репорты, а не количество кошельков.",
        ),
        lesson(
          "Амбассадорские программы",
          "Проекты награждают за переводы документации, статьи, модерацию и локальные митапы. Репутация аккаунта накапливается годами и конвертируется в роли, гранты и работу в индустрии.",
        ),
      ],
      quiz: vec![
        q(
          "l7q1",
          "Чем токены тестнета отличаются от токенов основной сети?",
          [
            "Ничем",
            "Они не имеют рыночной стоимости и нужны только для проверки работы сети",
            "Они дороже",
            "Их нельзя переводить",
          ],
          1,
          "Тестовые токены раздаются краном бесплатно; их смысл — моделировать нагрузку и сценарии без риска.",
        ),
        q(
          "l7q2",
          "Что ценится в участнике тестнета больше всего?",
          [
            "Сотня кошельков на одном сервере",
            "Стабильный аптайм ноды и качественные баг-репорты",
            "Красивый ник",
            "Максимум транзакций в минуту",
          ],
          1,
          "Мультиаккаунты отсеивают фильтрами, а стабильные операторы и внятные отчёты реально помогают проекту.",
        ),
        q(
          "l7q3",
          "Проект просит внести «депозит для участия в тестнете». Это…",
          [
            "Нормальная практика",
            "Скам: участие в тестнетах не требует вложений",
            "Требование регулятора",
            "Способ ускорить синхронизацию",
          ],
          1,
          "Тестнеты по определению бесплатны; платный «вход» — признак мошенничества.",
        ),
      ],
      xp_reward: 250,
      is_locked: true,
    },
    Level {
      id: 8,
      title: "Карьера в Web3".into(),
      description: "Роли в индустрии, портфолио на ончейн-активности и первые шаги к оферу.".into(),
      icon: "🚀".into(),
      color: "from-yellow-500 to-amber-600".into(),
      lessons: vec![
        lesson(
          "Карта ролей",
          "Web3 — это не только разработчики: нужны операторы нод, аналитики, комьюнити-менеджеры, технические писатели и исследователи безопасности. Почти в каждую роль можно войти через публичную работу в комьюнити.",
        ),
        lesson(
          "Портфолио",
          "В Web3 портфолио — это ончейн- и публичный след: ноды, которые вы держали, баг-репорты, статьи, пул-реквесты в опенсорс. Один содержательный разбор протокола весит больше десяти сертификатов.",
        ),
        lesson(
          "Первые шаги",
          "* Выберите 2–3 живых проекта и участвуйте в их тестнетах.\n* Ведите публичные заметки о том, что разворачивали и чинили.\n* Отвечайте на вопросы новичков — так вас замечают команды.\n> Консистентность за полгода решает больше, чем рывок за неделю.",
        ),
      ],
      quiz: vec![
        q(
          "l8q1",
          "Что в Web3 работает как портфолио?",
          [
            "Только диплом университета",
            "Публичный след: ноды, отчёты, статьи, код",
            "Скриншоты баланса",
            "Количество подписчиков",
          ],
          1,
          "Команды смотрят на проверяемую историю работы в экосистеме, а не на формальные регалии.",
        ),
        q(
          "l8q2",
          "Вы хотите стать оператором нод, опыта нет. С чего начать?",
          [
            "Купить дорогой сервер и ждать",
            "Пройти тестнеты нескольких проектов и задокументировать опыт",
            "Писать фаундерам в личку",
            "Сразу ставить валидатор в майннете на все сбережения",
          ],
          1,
          "Тестнеты дают реальный опыт эксплуатации без риска и создают публичную историю для резюме.",
        ),
        q(
          "l8q3",
          "Какая стратегия быстрее всего строит репутацию в комьюнити?",
          [
            "Регулярная полезная активность в течение месяцев",
            "Массовая рассылка резюме",
            "Покупка роли на сервере",
            "Смена ника каждую неделю",
          ],
          0,
          "Репутация в открытых сообществах накапливается от последовательного полезного вклада.",
        ),
      ],
      xp_reward: 300,
      is_locked: true,
    },
  ]
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn builtin_catalog_is_valid() {
    let catalog = Catalog::new(builtin_levels()).expect("builtin catalog");
    assert_eq!(catalog.len(), 8);
    assert_eq!(catalog.last_id(), 8);
    assert!(!catalog.levels()[0].is_locked);
    assert!(catalog.levels()[1..].iter().all(|l| l.is_locked));
  }

  #[test]
  fn non_contiguous_ids_are_rejected() {
    let mut levels = builtin_levels();
    levels[3].id = 9;
    assert!(Catalog::new(levels).is_err());
  }

  #[test]
  fn empty_quiz_bank_is_rejected() {
    let mut levels = builtin_levels();
    levels[0].quiz.clear();
    assert!(Catalog::new(levels).is_err());
  }

  #[test]
  fn malformed_question_is_rejected() {
    let mut levels = builtin_levels();
    levels[2].quiz[0].correct_answer_index = 7;
    assert!(Catalog::new(levels).is_err());
  }

  #[test]
  fn duplicate_question_ids_are_rejected() {
    let mut levels = builtin_levels();
    let dup = levels[0].quiz[0].id.clone();
    levels[1].quiz[0].id = dup;
    assert!(Catalog::new(levels).is_err());
  }
}
